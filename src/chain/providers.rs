use ethers::prelude::*;
use std::sync::Arc;

pub fn create_provider(rpc_url: &str) -> Result<Arc<Provider<Http>>, Box<dyn std::error::Error + Send + Sync>> {
    let provider = Provider::<Http>::try_from(rpc_url)?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_rejects_bad_url() {
        assert!(create_provider("not a url").is_err());
        assert!(create_provider("http://127.0.0.1:8545").is_ok());
    }
}
