use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapError};
use crate::math::slippage;

/// ERC-20 identity. Two tokens are equal when chain id and address match;
/// `decimals` and `symbol` are descriptive only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl Token {
    pub fn new(chain_id: u64, address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self { chain_id, address, decimals, symbol: symbol.into() }
    }

    /// Parses a hex address in any letter case.
    pub fn from_hex(chain_id: u64, address: &str, decimals: u8, symbol: impl Into<String>) -> Result<Self> {
        let address = Address::from_str(address)
            .map_err(|e| SwapError::invalid_route(format!("bad token address '{}': {}", address, e)))?;
        Ok(Self::new(chain_id, address, decimals, symbol))
    }

    /// Lower-case `0x`-prefixed address, the form used in path encoding.
    pub fn address_hex(&self) -> String {
        format!("{:#x}", self.address)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#x})", self.symbol, self.address)
    }
}

/// Amount of `token` in its smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Token,
    pub raw: U256,
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl TokenAmount {
    pub fn new(token: Token, raw: U256) -> Self {
        Self { token, raw }
    }

    /// Base-unit integer string as returned by the routing service ("1500000").
    pub fn from_raw_str(token: Token, raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.starts_with('-') {
            return Err(SwapError::invalid_amount(raw, "amount must not be negative"));
        }
        if !is_digits(trimmed) {
            return Err(SwapError::invalid_amount(raw, "expected a base-unit integer"));
        }
        let raw_value = U256::from_dec_str(trimmed)
            .map_err(|e| SwapError::invalid_amount(raw, e.to_string()))?;
        Ok(Self { token, raw: raw_value })
    }

    /// Human-unit decimal string ("1.25"), scaled by the token's decimals.
    pub fn from_decimal_str(token: Token, amount: &str) -> Result<Self> {
        let trimmed = amount.trim();
        if trimmed.starts_with('-') {
            return Err(SwapError::invalid_amount(amount, "amount must not be negative"));
        }
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(SwapError::invalid_amount(amount, "no digits"));
        }
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        if !is_digits(int_part) || (!frac_part.is_empty() && !is_digits(frac_part)) {
            return Err(SwapError::invalid_amount(amount, "not a decimal number"));
        }
        let decimals = token.decimals as usize;
        if frac_part.len() > decimals {
            return Err(SwapError::invalid_amount(
                amount,
                format!("more than {} fractional digits for {}", decimals, token.symbol),
            ));
        }
        let digits = format!("{}{:0<width$}", int_part, frac_part, width = decimals);
        let raw = U256::from_dec_str(&digits)
            .map_err(|e| SwapError::invalid_amount(amount, e.to_string()))?;
        Ok(Self { token, raw })
    }

    /// Renders `raw` in human units with exactly `token.decimals` fractional digits.
    pub fn to_exact(&self) -> String {
        let digits = self.raw.to_string();
        let decimals = self.token.decimals as usize;
        if decimals == 0 {
            return digits;
        }
        let padded = format!("{:0>width$}", digits, width = decimals + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
        format!("{}.{}", int_part, frac_part)
    }

    /// Derives the slippage-bounded amount for `percent` (e.g. "0.5").
    /// `is_minimum` selects the minimum-received side.
    pub fn with_slippage(&self, percent: &str, is_minimum: bool) -> Result<TokenAmount> {
        let bps = slippage::percent_to_basis_points(percent)?;
        self.with_slippage_bps(bps, is_minimum)
    }

    pub fn with_slippage_bps(&self, bps: u32, is_minimum: bool) -> Result<TokenAmount> {
        let raw = slippage::bounded_amount(self.raw, bps, is_minimum)?;
        Ok(TokenAmount { token: self.token.clone(), raw })
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_exact(), self.token.symbol)
    }
}

/// Fee-tiered concentrated-liquidity pool. `fee` is in hundredths of a bip;
/// zero means the quote did not carry a fee tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub token0: Token,
    pub token1: Token,
    pub fee: u32,
    pub sqrt_ratio_x96: Option<U256>,
    pub liquidity: Option<U256>,
    pub tick_current: Option<i32>,
}

impl Pool {
    pub fn new(token0: Token, token1: Token, fee: u32) -> Self {
        Self { token0, token1, fee, sqrt_ratio_x96: None, liquidity: None, tick_current: None }
    }

    pub fn involves(&self, token: &Token) -> bool {
        self.token0 == *token || self.token1 == *token
    }

    /// The side of the pool opposite `token`, if `token` is one of its sides.
    pub fn other(&self, token: &Token) -> Option<&Token> {
        if self.token0 == *token {
            Some(&self.token1)
        } else if self.token1 == *token {
            Some(&self.token0)
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn weth() -> Token {
        Token::from_hex(1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18, "WETH").unwrap()
    }

    pub(crate) fn usdc() -> Token {
        Token::from_hex(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6, "USDC").unwrap()
    }

    #[test]
    fn test_token_equality_ignores_case_and_metadata() {
        let a = Token::from_hex(1, "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", 18, "WETH").unwrap();
        let b = Token::from_hex(1, "0xC02AAA39B223FE8D0A0E5C4F27EAD9083C756CC2", 8, "Wrapped").unwrap();
        assert_eq!(a, b);

        let other_chain = Token::from_hex(10, "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", 18, "WETH").unwrap();
        assert_ne!(a, other_chain);
    }

    #[test]
    fn test_address_hex_is_lower_case() {
        assert_eq!(weth().address_hex(), "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    }

    #[test]
    fn test_from_raw_str_rejects_bad_input() {
        for bad in ["-1", "abc", "", "1.5", "1e18"] {
            let err = TokenAmount::from_raw_str(usdc(), bad).unwrap_err();
            assert!(matches!(err, SwapError::InvalidAmount { .. }), "{:?}", bad);
        }
        let ok = TokenAmount::from_raw_str(weth(), "115792089237316195423570985008687907853269984665640564039457584007913129639935").unwrap();
        assert_eq!(ok.raw, U256::MAX);
    }

    #[test]
    fn test_from_decimal_str_scales_by_decimals() {
        let a = TokenAmount::from_decimal_str(usdc(), "1540.25").unwrap();
        assert_eq!(a.raw, U256::from(1_540_250_000u64));

        let b = TokenAmount::from_decimal_str(weth(), ".5").unwrap();
        assert_eq!(b.raw, U256::from_dec_str("500000000000000000").unwrap());

        assert!(TokenAmount::from_decimal_str(usdc(), "0.0000001").is_err());
        assert!(TokenAmount::from_decimal_str(usdc(), "-2").is_err());
        assert!(TokenAmount::from_decimal_str(usdc(), "1.2.3").is_err());
        for empty in ["", ".", "  "] {
            let err = TokenAmount::from_decimal_str(usdc(), empty).unwrap_err();
            assert!(matches!(err, SwapError::InvalidAmount { .. }), "{:?}", empty);
        }
        assert_eq!(TokenAmount::from_decimal_str(usdc(), "2.").unwrap().raw, U256::from(2_000_000u64));
    }

    #[test]
    fn test_to_exact_pads_fraction() {
        let a = TokenAmount::new(usdc(), U256::from(42u64));
        assert_eq!(a.to_exact(), "0.000042");
        let b = TokenAmount::new(usdc(), U256::from(1_500_000u64));
        assert_eq!(b.to_exact(), "1.500000");
        assert_eq!(b.to_string(), "1.500000 USDC");
    }

    #[test]
    fn test_with_slippage_returns_new_amount() {
        let a = TokenAmount::new(usdc(), U256::from(1_000_000u64));
        let min = a.with_slippage("0.5", true).unwrap();
        let max = a.with_slippage("0.5", false).unwrap();
        assert_eq!(min.raw, U256::from(995_000u64));
        assert_eq!(max.raw, U256::from(1_005_000u64));
        assert_eq!(a.raw, U256::from(1_000_000u64));
    }

    #[test]
    fn test_pool_other_side() {
        let pool = Pool::new(usdc(), weth(), 500);
        assert_eq!(pool.other(&usdc()), Some(&weth()));
        assert_eq!(pool.other(&weth()), Some(&usdc()));
        let dai = Token::from_hex(1, "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18, "DAI").unwrap();
        assert!(pool.other(&dai).is_none());
        assert!(!pool.involves(&dai));
    }
}
