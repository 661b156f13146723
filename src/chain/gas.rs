// src/chain/gas.rs
//
// Gas limit selection for router calls.
// - One estimate through the signer
// - On failure, a fixed default limit (logged, not surfaced)
// - Either way, inflated by a safety margin

use ethers::types::U256;

use crate::chain::router::CallDescriptor;
use crate::chain::signer::SwapSigner;
use crate::error::SwapError;

pub const DEFAULT_GAS_LIMIT: u64 = 300_000;
pub const DEFAULT_GAS_MARGIN_PERCENT: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    pub default_limit: U256,
    pub margin_percent: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            default_limit: U256::from(DEFAULT_GAS_LIMIT),
            margin_percent: DEFAULT_GAS_MARGIN_PERCENT,
        }
    }
}

/// Result DTO for a gas limit decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasLimitEstimate {
    /// What the node returned, if it returned anything.
    pub estimated: Option<U256>,
    /// Limit to put on the transaction (margin applied).
    pub gas_limit: U256,
    pub used_fallback: bool,
}

/// limit * (100 + margin) / 100, saturating at U256::MAX.
#[inline]
pub fn with_margin(limit: U256, margin_percent: u64) -> U256 {
    limit
        .checked_mul(U256::from(100u64.saturating_add(margin_percent)))
        .map(|v| v / U256::from(100u64))
        .unwrap_or(U256::MAX)
}

/// Estimates gas for `call`, falling back to `policy.default_limit` on any error.
pub async fn estimate_gas_limit(
    signer: &dyn SwapSigner,
    call: &CallDescriptor,
    policy: &GasPolicy,
) -> GasLimitEstimate {
    match signer.estimate_gas(call).await {
        Ok(estimated) => {
            let gas_limit = with_margin(estimated, policy.margin_percent);
            log::debug!("{} gas estimate {} -> limit {}", call.function_name(), estimated, gas_limit);
            GasLimitEstimate { estimated: Some(estimated), gas_limit, used_fallback: false }
        }
        Err(e) => {
            let err = SwapError::GasEstimationFailed(e);
            log::warn!(
                "{} for {}; using default limit {}",
                err,
                call.function_name(),
                policy.default_limit
            );
            GasLimitEstimate {
                estimated: None,
                gas_limit: with_margin(policy.default_limit, policy.margin_percent),
                used_fallback: true,
            }
        }
    }
}
