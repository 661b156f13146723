// Slippage tolerance -> basis points, and min-out / max-in bound computation.
//
// Percent strings are parsed as exact decimals (never f64) so values like "0.1"
// convert without representation error. Bounds are multiply-then-divide in
// 512-bit space so a full-width U256 amount cannot overflow the intermediate.

use std::str::FromStr;

use ethers::types::{U256, U512};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{Result, SwapError};

pub const BPS_DENOMINATOR: u32 = 10_000;
pub const MAX_SLIPPAGE_BPS: u32 = 9_999;

/// "0.5" -> 50. Rejects values above 99.99 and anything with more than two
/// fractional digits.
pub fn percent_to_basis_points(percent: &str) -> Result<u32> {
    let trimmed = percent.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|_| SwapError::InvalidSlippage { input: percent.to_string() })?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(SwapError::InvalidSlippage { input: percent.to_string() });
    }
    if value > Decimal::new(MAX_SLIPPAGE_BPS as i64, 2) {
        return Err(SwapError::SlippageTooHigh { percent: trimmed.to_string() });
    }
    if value.normalize().scale() > 2 {
        return Err(SwapError::SlippagePrecisionExceeded { percent: trimmed.to_string() });
    }
    (value * Decimal::ONE_HUNDRED)
        .to_u32()
        .ok_or_else(|| SwapError::InvalidSlippage { input: percent.to_string() })
}

/// floor(amount * (10000 -/+ bps) / 10000).
///
/// The same floor applies to the maximum-in side, so that bound can sit one
/// base unit below the exact product.
pub fn bounded_amount(amount: U256, bps: u32, is_minimum: bool) -> Result<U256> {
    let adjusted = if is_minimum {
        BPS_DENOMINATOR
            .checked_sub(bps)
            .ok_or(SwapError::InvalidSlippage { input: format!("{} bps", bps) })?
    } else {
        BPS_DENOMINATOR
            .checked_add(bps)
            .ok_or(SwapError::InvalidSlippage { input: format!("{} bps", bps) })?
    };
    let product: U512 = amount.full_mul(U256::from(adjusted));
    let bounded = product / U512::from(BPS_DENOMINATOR);
    U256::try_from(bounded).map_err(|_| SwapError::AmountOverflow)
}
