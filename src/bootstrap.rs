use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use ethers::prelude::*;

use crate::chain::gas::GasPolicy;
use crate::chain::providers;
use crate::chain::signer::{EthersSigner, SwapSigner};
use crate::config::Config;
use crate::math::slippage;

pub struct AppState {
    pub provider: Arc<Provider<Http>>,
    pub chain_id: u64,
    /// `None` when no signing key is configured; swap execution is then refused.
    pub signer: Option<Arc<dyn SwapSigner>>,

    // Protocol addresses
    pub swap_router: Address,
    pub wrapped_native: Address,

    pub gas_policy: GasPolicy,
    pub swap_deadline_secs: u64,
    pub default_slippage_bps: u32,
    pub submit_timeout: Duration,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let provider = providers::create_provider(&config.rpc_url)
            .map_err(|e| anyhow!("{}", e))
            .context("creating RPC provider")?;

        let signer: Option<Arc<dyn SwapSigner>> = match &config.signer_private_key {
            Some(key) => {
                let signer = EthersSigner::new(provider.clone(), key, config.chain_id)
                    .map_err(|e| anyhow!("{}", e))
                    .context("loading SIGNER_PRIVATE_KEY")?;
                log::info!("swap execution enabled for {:#x}", signer.address());
                Some(Arc::new(signer))
            }
            None => {
                log::warn!("SIGNER_PRIVATE_KEY not set, swap execution disabled");
                None
            }
        };

        Ok(AppState {
            provider,
            chain_id: config.chain_id,
            signer,

            swap_router: Address::from_str(&config.swap_router_address).context("SWAP_ROUTER_ADDRESS")?,
            wrapped_native: Address::from_str(&config.wrapped_native_address).context("WRAPPED_NATIVE_ADDRESS")?,

            gas_policy: GasPolicy {
                default_limit: U256::from(config.default_gas_limit),
                margin_percent: config.gas_limit_margin_percent,
            },
            swap_deadline_secs: config.swap_deadline_secs,
            default_slippage_bps: slippage::percent_to_basis_points(&config.default_slippage_percent)?,
            submit_timeout: Duration::from_secs(config.submit_timeout_secs),
        })
    }
}
