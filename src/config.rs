use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub port: u16,

    // Protocol addresses
    pub swap_router_address: String,
    pub wrapped_native_address: String,

    // Execution is disabled when no key is configured
    pub signer_private_key: Option<String>,

    // Swap defaults
    pub default_gas_limit: u64,
    pub gas_limit_margin_percent: u64,
    pub swap_deadline_secs: u64,
    pub default_slippage_percent: String,
    pub submit_timeout_secs: u64,
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| anyhow!("{} must be set", name))
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e| anyhow!("{}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load configuration files (secrets first, then public config)
        dotenv::from_filename("secrets.env").ok();
        dotenv::from_filename("config/router.env").ok();
        dotenv::dotenv().ok();

        let config = Config {
            rpc_url: required("RPC_URL")?,
            chain_id: parsed_or("CHAIN_ID", 1)?,
            port: parsed_or("PORT", 8000)?,

            swap_router_address: required("SWAP_ROUTER_ADDRESS")?,
            wrapped_native_address: required("WRAPPED_NATIVE_ADDRESS")?,

            signer_private_key: env::var("SIGNER_PRIVATE_KEY").ok().filter(|k| !k.trim().is_empty()),

            default_gas_limit: parsed_or("DEFAULT_GAS_LIMIT", 300_000)?,
            gas_limit_margin_percent: parsed_or("GAS_LIMIT_MARGIN_PERCENT", 20)?,
            swap_deadline_secs: parsed_or("SWAP_DEADLINE_SECS", 1200)?,
            default_slippage_percent: env::var("DEFAULT_SLIPPAGE_PERCENT").unwrap_or_else(|_| "0.5".to_string()),
            submit_timeout_secs: parsed_or("SUBMIT_TIMEOUT_SECS", 120)?,
        };
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        crate::math::slippage::percent_to_basis_points(&self.default_slippage_percent)
            .context("DEFAULT_SLIPPAGE_PERCENT")?;
        if self.swap_deadline_secs == 0 {
            return Err(anyhow!("SWAP_DEADLINE_SECS must be positive"));
        }
        Ok(())
    }
}
