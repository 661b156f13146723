// tests/tick_math_validation.rs
// ===================================
// Known-value checks for tick, liquidity and exchange-rate math

use ethers::types::U256;
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::str::FromStr;
use v3_swap_router::math::slippage::{bounded_amount, percent_to_basis_points};
use v3_swap_router::math::tick_math::*;

#[test]
fn test_single_interval_deposit_amounts() {
    let one = Decimal::ONE;
    let two = Decimal::from(2);

    assert_eq!(amount0_for_liquidity("0.000001", one, 18).unwrap(), "0.000000999950003750");
    assert_eq!(amount0_for_liquidity("0.000001", two, 18).unwrap(), "0.000000500015918128");
    assert_eq!(amount1_for_liquidity("1", one, 18).unwrap(), "1.000049998750062486");
    assert_eq!(amount1_for_liquidity("1", two, 18).unwrap(), "1.999936329514114080");
}

#[test]
fn test_exchange_rate_usdc_weth() {
    let sqrt = U256::from_dec_str("2018382873588440326581633304624437").unwrap();
    let rate = pool_exchange_rate(sqrt, 6, 18).unwrap();
    assert_eq!(rate.token0_to_token1, "1540.820552");
    assert_eq!(rate.token1_to_token0, "0.000649004842701370");
}

#[test]
fn test_price_to_tick_clamps() {
    let huge = Decimal::from_str("79228162514264337593543950335").unwrap();
    assert_eq!(price_to_tick(huge, Some(255), Some(0)).unwrap(), MAX_TICK);

    let tiny = Decimal::from_str("0.0000000000000000000000000001").unwrap();
    assert_eq!(price_to_tick(tiny, Some(0), Some(255)).unwrap(), MIN_TICK);

    assert!(price_to_tick(Decimal::ZERO, None, None).is_err());
}

#[test]
fn test_q96_tick_math_bounds() {
    assert_eq!(sqrt_ratio_x96_at_tick(MIN_TICK).unwrap(), BigInt::from_str(MIN_SQRT_RATIO).unwrap());
    assert_eq!(sqrt_ratio_x96_at_tick(MAX_TICK).unwrap(), BigInt::from_str(MAX_SQRT_RATIO).unwrap());
    assert_eq!(sqrt_ratio_x96_at_tick(0).unwrap(), BigInt::from(1u8) << 96);

    let sqrt = sqrt_ratio_x96_at_tick(200_838).unwrap();
    assert_eq!(tick_at_sqrt_ratio_x96(&sqrt).unwrap(), 200_838);
    assert!(sqrt_ratio_x96_at_tick(MAX_TICK + 1).is_err());
}

#[test]
fn test_tick_to_price_is_lossy_inverse() {
    let tick = price_to_tick(Decimal::from(3000), Some(18), Some(6)).unwrap();
    let back = tick_to_price(tick, 18, 6);
    let err = (back - 3000.0).abs() / 3000.0;
    assert!(err < 0.0001, "round trip error {}", err);
    assert!(back <= 3000.0);
}

#[test]
fn test_slippage_bounds_bracket_amount() {
    let amounts = ["0", "1", "999", "1000000", "340282366920938463463374607431768211455"];
    for bps_str in ["0", "0.01", "0.5", "3", "50", "99.99"] {
        let bps = percent_to_basis_points(bps_str).unwrap();
        for a in amounts {
            let amount = U256::from_dec_str(a).unwrap();
            let lo = bounded_amount(amount, bps, true).unwrap();
            let hi = bounded_amount(amount, bps, false).unwrap();
            assert!(lo <= amount && amount <= hi, "{} @ {}", a, bps_str);
        }
    }
}
