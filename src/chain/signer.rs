// signer.rs - Wallet-signer capability used by the swap executor.
//
// The executor only ever talks to `SwapSigner`; tests inject a mock, the service
// injects `EthersSigner` (local key + HTTP provider).

use std::sync::Arc;

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;

use crate::chain::router::CallDescriptor;
use crate::error::BoxError;

#[async_trait]
pub trait SwapSigner: Send + Sync {
    /// Address transactions are sent from.
    fn address(&self) -> Address;

    async fn estimate_gas(&self, call: &CallDescriptor) -> Result<U256, BoxError>;

    /// Signs and broadcasts `call`, returning the transaction hash.
    async fn submit(&self, call: &CallDescriptor) -> Result<TxHash, BoxError>;
}

pub struct EthersSigner {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
}

impl EthersSigner {
    pub fn new(provider: Arc<Provider<Http>>, private_key: &str, chain_id: u64) -> Result<Self, BoxError> {
        let wallet: LocalWallet = private_key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| format!("Failed to parse signer private key: {}", e))?
            .with_chain_id(chain_id);
        let client = SignerMiddleware::new((*provider).clone(), wallet);
        Ok(Self { client: Arc::new(client) })
    }
}

#[async_trait]
impl SwapSigner for EthersSigner {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn estimate_gas(&self, call: &CallDescriptor) -> Result<U256, BoxError> {
        let tx: TypedTransaction = call.to_transaction_request(Some(self.address())).into();
        let gas = self.client.estimate_gas(&tx, None).await?;
        Ok(gas)
    }

    async fn submit(&self, call: &CallDescriptor) -> Result<TxHash, BoxError> {
        let tx = call.to_transaction_request(Some(self.address()));
        let pending = self.client.send_transaction(tx, None).await?;
        Ok(pending.tx_hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil / Hardhat default account #0
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_signer_address_from_key() {
        let provider = Arc::new(Provider::<Http>::try_from("http://127.0.0.1:8545").unwrap());
        let signer = EthersSigner::new(provider, TEST_KEY, 1).unwrap();
        assert_eq!(
            format!("{:#x}", signer.address()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_bad_key_is_rejected() {
        let provider = Arc::new(Provider::<Http>::try_from("http://127.0.0.1:8545").unwrap());
        assert!(EthersSigner::new(provider, "not-a-key", 1).is_err());
    }
}
