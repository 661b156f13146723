// Tick / price math for concentrated-liquidity pools
// ----------------------------------------------------------------------------------------
// Two families live here:
//
// 1. On-chain exact Q64.96 helpers (BigInt): TickMath.getSqrtRatioAtTick and its binary
//    search inverse. Used to sanity-check pool state carried in a quote.
// 2. Display / deposit-sizing helpers (Decimal): price <-> tick, sqrt(1.0001^tick), and the
//    single tick-spacing amount <-> liquidity derivation used to size deposits into pools
//    that have no liquidity yet.
//
// Precision budget for (2): the sqrt ratio is seeded from f64 (shortest round-trip repr,
// ~17 significant digits) and every subsequent Decimal operation is rounded to 20
// significant digits, half away from zero. Results are rendered at the token's decimals.
// Reported amounts are therefore display estimates, not on-chain-exact quantities.
//
// sqrtPriceX96 -> exchange rate is computed with exact big-integer ratios.

use std::str::FromStr;

use ethers::types::U256;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::{Result, SwapError};

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// getSqrtRatioAtTick(MIN_TICK)
pub const MIN_SQRT_RATIO: &str = "4295128739";
/// getSqrtRatioAtTick(MAX_TICK)
pub const MAX_SQRT_RATIO: &str = "1461446703485210103287273052203988822378723970342";

const SIGNIFICANT_DIGITS: u32 = 20;
const MAX_SCALE: u32 = 28;
const TICK_BASE: f64 = 1.0001;

// --------------------------------- Helpers ---------------------------------

#[inline]
fn sig(d: Decimal) -> Decimal {
    let rounded = d
        .round_sf_with_strategy(SIGNIFICANT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .unwrap_or(d);
    // round_sf can hand back a scale above 28 for very small values
    if rounded.scale() > MAX_SCALE {
        rounded.normalize().round_dp(MAX_SCALE)
    } else {
        rounded
    }
}

#[inline]
fn div(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_div(b)
        .map(sig)
        .ok_or_else(|| SwapError::InvalidPrice { input: "division out of range".to_string() })
}

#[inline]
fn mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .map(sig)
        .ok_or_else(|| SwapError::InvalidPrice { input: "multiplication out of range".to_string() })
}

/// f64 -> Decimal through the shortest round-trip representation.
fn decimal_from_f64(v: f64) -> Result<Decimal> {
    if !v.is_finite() {
        return Err(SwapError::InvalidPrice { input: v.to_string() });
    }
    Decimal::from_str(&v.to_string())
        .map(sig)
        .map_err(|_| SwapError::InvalidPrice { input: v.to_string() })
}

fn bigint_from_u256(v: U256) -> BigInt {
    let mut buf = [0u8; 32];
    v.to_big_endian(&mut buf);
    BigInt::from_bytes_be(num_bigint::Sign::Plus, &buf)
}

/// Fixed-point rendering with exactly `dp` fractional digits.
pub fn render_fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp.min(28), RoundingStrategy::MidpointAwayFromZero);
    let text = rounded.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text, String::new()),
    };
    if dp == 0 {
        return int_part;
    }
    format!("{}.{:0<width$}", int_part, frac_part, width = dp as usize)
}

/// round_half_up(num / den) rendered with `dp` fractional digits.
fn render_ratio(num: &BigUint, den: &BigUint, dp: u32) -> String {
    let scaled = num * BigUint::from(10u32).pow(dp);
    let (q, r) = scaled.div_rem(den);
    let q = if &r * 2u32 >= *den { q + 1u32 } else { q };
    let digits = q.to_str_radix(10);
    if dp == 0 {
        return digits;
    }
    let width = dp as usize + 1;
    let padded = format!("{:0>width$}", digits, width = width);
    let (int_part, frac_part) = padded.split_at(padded.len() - dp as usize);
    format!("{}.{}", int_part, frac_part)
}

// -------------------------------- Tick Math --------------------------------

/// Exact TickMath.getSqrtRatioAtTick (Q64.96 integer).
pub fn sqrt_ratio_x96_at_tick(tick: i32) -> Result<BigInt> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(SwapError::InvalidPrice { input: format!("tick {}", tick) });
    }
    let abs_tick = tick.unsigned_abs();

    // ratio is Q128.128
    let mut ratio = if abs_tick & 0x1 != 0 {
        BigInt::parse_bytes(b"fffcb933bd6fad37aa2d162d1a594001", 16).unwrap_or_default()
    } else {
        BigInt::one() << 128
    };

    const MAGIC: [(u32, &[u8]); 19] = [
        (0x2, b"fff97272373d413259a46990580e213a"),
        (0x4, b"fff2e50f5f656932ef12357cf3c7fdcc"),
        (0x8, b"ffe5caca7e10e4e61c3624eaa0941cd0"),
        (0x10, b"ffcb9843d60f6159c9db58835c926644"),
        (0x20, b"ff973b41fa98c081472e6896dfb254c0"),
        (0x40, b"ff2ea16466c96a3843ec78b326b52861"),
        (0x80, b"fe5dee046a99a2a811c461f1969c3053"),
        (0x100, b"fcbe86c7900a88aedcffc83b479aa3a4"),
        (0x200, b"f987a7253ac413176f2b074cf7815e54"),
        (0x400, b"f3392b0822b70005940c7a398e4b70f3"),
        (0x800, b"e7159475a2c29b7443b29c7fa6e889d9"),
        (0x1000, b"d097f3bdfd2022b8845ad8f792aa5825"),
        (0x2000, b"a9f746462d870fdf8a65dc1f90e061e5"),
        (0x4000, b"70d869a156d2a1b890bb3df62baf32f7"),
        (0x8000, b"31be135f97d08fd981231505542fcfa6"),
        (0x10000, b"09aa508b5b7a84e1c677de54f3e99bc9"),
        (0x20000, b"05d6af8dedb81196699c329225ee604"),
        (0x40000, b"01dcdc6f2d7c3395a2ed4f8b7feaf38"),
        (0x80000, b"48a170391f7dc42444e8fa2"),
    ];

    for (mask, hex) in MAGIC {
        if abs_tick & mask != 0 {
            let factor = BigInt::parse_bytes(hex, 16).unwrap_or_default();
            ratio = (&ratio * factor) >> 128;
        }
    }

    if tick > 0 {
        let max = (BigInt::one() << 256) - 1;
        ratio = max / ratio;
    }
    // round-up shift by 32 (Q128.128 -> Q64.96)
    Ok((&ratio + ((BigInt::one() << 32) - 1)) >> 32)
}

/// Binary search inverse of `sqrt_ratio_x96_at_tick` (greatest tick whose ratio <= input).
pub fn tick_at_sqrt_ratio_x96(sqrt_price_x96: &BigInt) -> Result<i32> {
    let min = BigInt::from_str(MIN_SQRT_RATIO).unwrap_or_default();
    let max = BigInt::from_str(MAX_SQRT_RATIO).unwrap_or_default();
    if *sqrt_price_x96 < min || *sqrt_price_x96 >= max {
        return Err(SwapError::InvalidPrice { input: sqrt_price_x96.to_string() });
    }
    let mut lo = MIN_TICK;
    let mut hi = MAX_TICK;
    while lo < hi {
        let mid = lo + ((hi - lo + 1) / 2);
        if sqrt_ratio_x96_at_tick(mid)? <= *sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// Whether a sqrtPriceX96 read from slot0 lies in [MIN_SQRT_RATIO, MAX_SQRT_RATIO).
pub fn is_valid_sqrt_ratio(sqrt_price_x96: U256) -> bool {
    let v = bigint_from_u256(sqrt_price_x96);
    let min = BigInt::from_str(MIN_SQRT_RATIO).unwrap_or_default();
    let max = BigInt::from_str(MAX_SQRT_RATIO).unwrap_or_default();
    v >= min && v < max
}

// ---------------------------- Price <-> tick ----------------------------

/// floor(log_1.0001(price * 10^(decimal0 - decimal1))), clamped to [MIN_TICK, MAX_TICK].
/// Lossy: `tick_to_price(price_to_tick(p))` is generally not `p`.
pub fn price_to_tick(price: Decimal, decimal0: Option<u8>, decimal1: Option<u8>) -> Result<i32> {
    if price <= Decimal::ZERO {
        return Err(SwapError::InvalidPrice { input: price.to_string() });
    }
    let price_f = price
        .to_f64()
        .ok_or_else(|| SwapError::InvalidPrice { input: price.to_string() })?;
    let scaled = match (decimal0, decimal1) {
        (Some(d0), Some(d1)) => price_f * 10f64.powi(d0 as i32 - d1 as i32),
        _ => price_f,
    };
    let t = (scaled.ln() / TICK_BASE.ln()).floor();
    if t.is_nan() {
        return Err(SwapError::InvalidPrice { input: price.to_string() });
    }
    Ok(t.clamp(MIN_TICK as f64, MAX_TICK as f64) as i32)
}

/// Human price (token1 per token0) at `tick`. Display only.
pub fn tick_to_price(tick: i32, decimal0: u8, decimal1: u8) -> f64 {
    TICK_BASE.powf(tick as f64) * 10f64.powi(decimal1 as i32 - decimal0 as i32)
}

/// sqrt(1.0001^tick) as a Decimal (f64 seed, 20 significant digits).
pub fn sqrt_ratio_at_tick(tick: i32) -> Result<Decimal> {
    let tick = tick.clamp(MIN_TICK, MAX_TICK);
    decimal_from_f64(TICK_BASE.powf(tick as f64).sqrt())
}

// ----------------------- Amount <-> liquidity (one interval) -----------------------

#[inline]
fn sorted(a: Decimal, b: Decimal) -> (Decimal, Decimal) {
    if a <= b { (a, b) } else { (b, a) }
}

#[inline]
fn inverse_spread(lower: Decimal, upper: Decimal) -> Result<Decimal> {
    let inv_lower = div(Decimal::ONE, lower)?;
    let inv_upper = div(Decimal::ONE, upper)?;
    Ok(sig(inv_lower - inv_upper))
}

/// L = amount1 / (sqrtUpper - sqrtLower)
pub fn liquidity_for_amount1(sqrt_a: Decimal, sqrt_b: Decimal, amount1: Decimal) -> Result<Decimal> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    div(amount1, sig(upper - lower))
}

/// L = amount0 / (1/sqrtLower - 1/sqrtUpper)
pub fn liquidity_for_amount0(sqrt_a: Decimal, sqrt_b: Decimal, amount0: Decimal) -> Result<Decimal> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    div(amount0, inverse_spread(lower, upper)?)
}

/// amount0 = L * (1/sqrtLower - 1/sqrtUpper)
pub fn amount0_from_liquidity(sqrt_a: Decimal, sqrt_b: Decimal, liquidity: Decimal) -> Result<Decimal> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    mul(liquidity, inverse_spread(lower, upper)?)
}

/// amount1 = L * (sqrtUpper - sqrtLower)
pub fn amount1_from_liquidity(sqrt_a: Decimal, sqrt_b: Decimal, liquidity: Decimal) -> Result<Decimal> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    mul(liquidity, sig(upper - lower))
}

fn parse_human_amount(amount: &str) -> Result<Decimal> {
    let value = Decimal::from_str(amount.trim())
        .map_err(|_| SwapError::invalid_amount(amount, "not a decimal number"))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(SwapError::invalid_amount(amount, "amount must not be negative"));
    }
    Ok(value)
}

/// Sqrt bounds of the single interval [tick, tick + 1] that `price` falls in.
fn interval_at_price(price: Decimal) -> Result<(Decimal, Decimal)> {
    let tick = price_to_tick(price, None, None)?.min(MAX_TICK - 1);
    Ok((sqrt_ratio_at_tick(tick)?, sqrt_ratio_at_tick(tick + 1)?))
}

/// Token0 amount (rendered at `decimal0`) that pairs with `amount1` when depositing
/// into a pool at `price`.
pub fn amount0_for_liquidity(amount1: &str, price: Decimal, decimal0: u8) -> Result<String> {
    let amount1 = parse_human_amount(amount1)?;
    let (lower, upper) = interval_at_price(price)?;
    let liquidity = liquidity_for_amount1(lower, upper, amount1)?;
    let amount0 = amount0_from_liquidity(lower, upper, liquidity)?;
    Ok(render_fixed(amount0, decimal0 as u32))
}

/// Token1 amount (rendered at `decimal1`) that pairs with `amount0`.
pub fn amount1_for_liquidity(amount0: &str, price: Decimal, decimal1: u8) -> Result<String> {
    let amount0 = parse_human_amount(amount0)?;
    let (lower, upper) = interval_at_price(price)?;
    let liquidity = liquidity_for_amount0(lower, upper, amount0)?;
    let amount1 = amount1_from_liquidity(lower, upper, liquidity)?;
    Ok(render_fixed(amount1, decimal1 as u32))
}

// ----------------------------- Exchange rate -----------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolExchangeRate {
    /// Whole-token1 price in token0, rendered at token0's decimals.
    pub token0_to_token1: String,
    /// Whole-token0 price in token1, rendered at token1's decimals.
    pub token1_to_token0: String,
}

/// Exchange rates from slot0's sqrtPriceX96.
/// price(token1 per token0) = (sqrtPriceX96 / 2^96)^2 * 10^(decimals0 - decimals1)
pub fn pool_exchange_rate(sqrt_price_x96: U256, decimals0: u8, decimals1: u8) -> Result<PoolExchangeRate> {
    if sqrt_price_x96.is_zero() {
        return Err(SwapError::InvalidPrice { input: "sqrtPriceX96 = 0".to_string() });
    }
    let mut buf = [0u8; 32];
    sqrt_price_x96.to_big_endian(&mut buf);
    let sqrt = BigUint::from_bytes_be(&buf);

    let ten = BigUint::from(10u32);
    let q192 = BigUint::one() << 192;
    let scale0 = ten.clone().pow(decimals0 as u32);
    let scale1 = ten.pow(decimals1 as u32);

    // token1 per token0 = sqrt^2 * 10^d0 / (2^192 * 10^d1)
    let num = &sqrt * &sqrt * &scale0;
    let den = &q192 * &scale1;
    if num.is_zero() {
        return Err(SwapError::InvalidPrice { input: sqrt_price_x96.to_string() });
    }

    Ok(PoolExchangeRate {
        token0_to_token1: render_ratio(&den, &num, decimals0 as u32),
        token1_to_token0: render_ratio(&num, &den, decimals1 as u32),
    })
}

/// Parses a decimal price string for the tick helpers.
pub fn parse_price(price: &str) -> Result<Decimal> {
    let value = Decimal::from_str(price.trim())
        .or_else(|_| price.trim().parse::<f64>().ok().and_then(Decimal::from_f64).ok_or(()))
        .map_err(|_| SwapError::InvalidPrice { input: price.to_string() })?;
    if value <= Decimal::ZERO {
        return Err(SwapError::InvalidPrice { input: price.to_string() });
    }
    Ok(value)
}

// ------------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_ratio_bounds_match_protocol_constants() {
        assert_eq!(sqrt_ratio_x96_at_tick(MIN_TICK).unwrap().to_string(), MIN_SQRT_RATIO);
        assert_eq!(sqrt_ratio_x96_at_tick(MAX_TICK).unwrap().to_string(), MAX_SQRT_RATIO);
        assert_eq!(sqrt_ratio_x96_at_tick(0).unwrap(), BigInt::one() << 96);
        assert!(sqrt_ratio_x96_at_tick(MAX_TICK + 1).is_err());
    }

    #[test]
    fn test_tick_at_sqrt_ratio_inverts_on_grid() {
        for tick in [-200_000, -60, -1, 0, 1, 60, 195_000] {
            let ratio = sqrt_ratio_x96_at_tick(tick).unwrap();
            assert_eq!(tick_at_sqrt_ratio_x96(&ratio).unwrap(), tick);
            assert_eq!(tick_at_sqrt_ratio_x96(&(&ratio + 1)).unwrap(), tick);
        }
    }

    #[test]
    fn test_price_to_tick() {
        assert_eq!(price_to_tick(Decimal::ONE, None, None).unwrap(), 0);
        assert_eq!(price_to_tick(Decimal::TWO, None, None).unwrap(), 6931);
        // decimals ignored unless both given
        assert_eq!(price_to_tick(Decimal::TWO, Some(18), None).unwrap(), 6931);
        // 1 token0 (18 dp) = 1 token1 (6 dp) -> raw price 1e12
        assert_eq!(price_to_tick(Decimal::ONE, Some(18), Some(6)).unwrap(), 276_324);
        assert!(price_to_tick(Decimal::ZERO, None, None).is_err());
        assert!(price_to_tick(Decimal::NEGATIVE_ONE, None, None).is_err());
    }

    #[test]
    fn test_price_to_tick_clamps() {
        let huge = Decimal::MAX;
        assert_eq!(price_to_tick(huge, Some(77), Some(0)).unwrap(), MAX_TICK);
        let tiny = Decimal::new(1, 28);
        assert_eq!(price_to_tick(tiny, Some(0), Some(77)).unwrap(), MIN_TICK);
    }

    #[test]
    fn test_tick_price_roundtrip_is_close_not_exact() {
        let tick = price_to_tick(Decimal::new(3000, 0), None, None).unwrap();
        let back = tick_to_price(tick, 0, 0);
        assert!(back <= 3000.0);
        assert!((3000.0 - back) / 3000.0 < 0.0001);
    }

    #[test]
    fn test_sqrt_ratio_at_tick_uses_float_seed() {
        assert_eq!(sqrt_ratio_at_tick(0).unwrap(), Decimal::ONE);
        assert_eq!(sqrt_ratio_at_tick(1).unwrap(), Decimal::from_str("1.0000499987500624").unwrap());
    }

    #[test]
    fn test_liquidity_helpers_sort_bounds() {
        let lo = sqrt_ratio_at_tick(0).unwrap();
        let hi = sqrt_ratio_at_tick(1).unwrap();
        let amount = Decimal::new(1, 6);
        assert_eq!(
            liquidity_for_amount1(lo, hi, amount).unwrap(),
            liquidity_for_amount1(hi, lo, amount).unwrap()
        );
        let l = liquidity_for_amount1(lo, hi, amount).unwrap();
        assert_eq!(
            amount0_from_liquidity(lo, hi, l).unwrap(),
            amount0_from_liquidity(hi, lo, l).unwrap()
        );
    }

    #[test]
    fn test_amount0_for_liquidity_vectors() {
        assert_eq!(amount0_for_liquidity("0.000001", Decimal::ONE, 18).unwrap(), "0.000000999950003750");
        assert_eq!(amount0_for_liquidity("0.000001", Decimal::TWO, 18).unwrap(), "0.000000500015918128");
    }

    #[test]
    fn test_amount1_for_liquidity_vectors() {
        assert_eq!(amount1_for_liquidity("1", Decimal::ONE, 18).unwrap(), "1.000049998750062486");
        assert_eq!(amount1_for_liquidity("1", Decimal::TWO, 18).unwrap(), "1.999936329514114080");
    }

    #[test]
    fn test_liquidity_amount_rejects_negative() {
        assert!(matches!(
            amount0_for_liquidity("-1", Decimal::ONE, 18),
            Err(SwapError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_pool_exchange_rate_usdc_weth() {
        let sqrt = U256::from_dec_str("2018382873588440326581633304624437").unwrap();
        let rate = pool_exchange_rate(sqrt, 6, 18).unwrap();
        assert_eq!(rate.token0_to_token1, "1540.820552");
        assert_eq!(rate.token1_to_token0, "0.000649004842701370");
    }

    #[test]
    fn test_pool_exchange_rate_rejects_zero() {
        assert!(pool_exchange_rate(U256::zero(), 6, 18).is_err());
    }

    #[test]
    fn test_render_fixed_pads() {
        assert_eq!(render_fixed(Decimal::ONE, 3), "1.000");
        assert_eq!(render_fixed(Decimal::new(12345, 4), 2), "1.23");
        assert_eq!(render_fixed(Decimal::new(5, 1), 0), "1");
    }

    #[test]
    fn test_is_valid_sqrt_ratio() {
        assert!(is_valid_sqrt_ratio(U256::from_dec_str("2018382873588440326581633304624437").unwrap()));
        assert!(!is_valid_sqrt_ratio(U256::from(4295128738u64)));
        assert!(!is_valid_sqrt_ratio(U256::from_dec_str(MAX_SQRT_RATIO).unwrap()));
    }

    #[test]
    fn test_tiny_sqrt_ratio_stays_within_decimal_scale() {
        let sqrt = sqrt_ratio_at_tick(-506_595).unwrap();
        assert!(sqrt.scale() <= 28, "scale {}", sqrt.scale());
        assert!(sqrt.to_string().starts_with("0.00000000000999"));
    }

    #[test]
    fn test_extreme_deposit_inputs_error_instead_of_panicking() {
        let max_amount = "79228162514264337593543950335";
        let tiny = parse_price("0.0000000000000000000001").unwrap();

        let err = amount0_for_liquidity(max_amount, tiny, 18).unwrap_err();
        assert!(matches!(err, SwapError::InvalidPrice { .. }));
        assert!(!err.to_string().is_empty());

        let amount1 = amount1_for_liquidity(max_amount, tiny, 18).unwrap();
        assert!(Decimal::from_str(&amount1).is_ok());

        for price in ["0.0000000000000000000001", "0.000000000001", "1000000000000", "79228162514264337593543950335"] {
            let price = parse_price(price).unwrap();
            for amount in ["0", "0.000001", "1", max_amount] {
                // Ok or a typed error, never a panic
                let _ = amount0_for_liquidity(amount, price, 18).map(|s| s.len());
                let _ = amount1_for_liquidity(amount, price, 18).map(|s| s.len());
            }
        }
    }
}
