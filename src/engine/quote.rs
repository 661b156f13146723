// quote.rs - Wire format of the routing service's quote response.
//
// Amounts, fees and decimals arrive as decimal strings (sometimes bare numbers);
// everything is parsed into exact integers here, never through f64.

use std::str::FromStr;

use ethers::types::U256;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapError};
use crate::math::tick_math;
use crate::models::{Pool, Token};

/// A JSON value the routing service may send as either a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteNumber {
    Int(i64),
    Text(String),
}

impl QuoteNumber {
    pub fn parse<T: FromStr>(&self) -> Option<T> {
        match self {
            QuoteNumber::Int(v) => v.to_string().parse().ok(),
            QuoteNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteToken {
    pub chain_id: u64,
    pub address: String,
    pub decimals: QuoteNumber,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl QuoteToken {
    pub fn to_token(&self) -> Result<Token> {
        let decimals: u8 = self.decimals.parse().ok_or_else(|| {
            SwapError::invalid_route(format!("token {} has invalid decimals {:?}", self.address, self.decimals))
        })?;
        Token::from_hex(self.chain_id, &self.address, decimals, self.symbol.clone().unwrap_or_default())
    }
}

/// One pool hop of a quoted route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HopDescriptor {
    #[serde(default)]
    pub address: Option<String>,
    pub token_in: QuoteToken,
    pub token_out: QuoteToken,
    #[serde(default)]
    pub fee: Option<QuoteNumber>,
    #[serde(default)]
    pub sqrt_ratio_x96: Option<String>,
    #[serde(default)]
    pub liquidity: Option<String>,
    #[serde(default)]
    pub tick_current: Option<QuoteNumber>,
}

impl HopDescriptor {
    /// Builds the pool for hop `hop`. A missing fee maps to 0 and is rejected later,
    /// when a call shape is selected.
    pub fn to_pool(&self, hop: usize) -> Result<Pool> {
        let fee = match &self.fee {
            None => 0,
            Some(raw) => raw.parse::<u32>().ok_or(SwapError::MissingFeeTier { hop })?,
        };
        let mut pool = Pool::new(self.token_in.to_token()?, self.token_out.to_token()?, fee);

        if let Some(raw) = &self.sqrt_ratio_x96 {
            let sqrt = U256::from_dec_str(raw.trim())
                .map_err(|_| SwapError::invalid_route(format!("hop {} sqrtRatioX96 '{}'", hop, raw)))?;
            if !tick_math::is_valid_sqrt_ratio(sqrt) {
                return Err(SwapError::invalid_route(format!("hop {} sqrtRatioX96 {} out of range", hop, sqrt)));
            }
            pool.sqrt_ratio_x96 = Some(sqrt);
        }
        if let Some(raw) = &self.liquidity {
            let liquidity = U256::from_dec_str(raw.trim())
                .map_err(|_| SwapError::invalid_route(format!("hop {} liquidity '{}'", hop, raw)))?;
            pool.liquidity = Some(liquidity);
        }
        if let Some(raw) = &self.tick_current {
            let tick: i32 = raw
                .parse()
                .filter(|t| (tick_math::MIN_TICK..=tick_math::MAX_TICK).contains(t))
                .ok_or_else(|| SwapError::invalid_route(format!("hop {} tickCurrent {:?}", hop, raw)))?;
            pool.tick_current = Some(tick);
        }

        if let (Some(sqrt), Some(tick)) = (pool.sqrt_ratio_x96, pool.tick_current) {
            let sqrt_bi = BigInt::from_str(&sqrt.to_string()).unwrap_or_default();
            if let Ok(derived) = tick_math::tick_at_sqrt_ratio_x96(&sqrt_bi) {
                if derived != tick {
                    log::debug!("hop {}: quoted tickCurrent {} but sqrtRatioX96 maps to tick {}", hop, tick, derived);
                }
            }
        }
        Ok(pool)
    }
}

/// Routing-service quote. Only the fields the trade builder consumes are typed;
/// the rest is carried for logging and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub route: Vec<Vec<HopDescriptor>>,
    /// The side fixed by the request, in base units.
    pub amount: String,
    /// The side returned by the router, in base units.
    pub quote: String,
    #[serde(default)]
    pub gas_use_estimate: Option<QuoteNumber>,
    #[serde(default, rename = "gasUseEstimateUSD")]
    pub gas_use_estimate_usd: Option<QuoteNumber>,
    #[serde(default)]
    pub block_number: Option<QuoteNumber>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    pub(crate) const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
    pub(crate) const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

    pub(crate) fn token_json(address: &str, decimals: u8, symbol: &str) -> serde_json::Value {
        serde_json::json!({ "chainId": 1, "address": address, "decimals": decimals.to_string(), "symbol": symbol })
    }

    pub(crate) fn hop_json(
        token_in: serde_json::Value,
        token_out: serde_json::Value,
        fee: &str,
    ) -> serde_json::Value {
        serde_json::json!({
            "type": "v3-pool",
            "tokenIn": token_in,
            "tokenOut": token_out,
            "fee": fee,
            "sqrtRatioX96": "2018382873588440326581633304624437",
            "liquidity": "19695554806197418925",
            "tickCurrent": "200838"
        })
    }

    #[test]
    fn test_quote_deserialization() {
        let json = serde_json::json!({
            "route": [[hop_json(token_json(USDC, 6, "USDC"), token_json(WETH, 18, "WETH"), "500")]],
            "amount": "1000000000",
            "quote": "648983016412487901",
            "gasUseEstimate": "113000",
            "gasUseEstimateUSD": "4.12",
            "blockNumber": 19000000
        });
        let quote: QuoteResponse = serde_json::from_value(json).unwrap();
        assert_eq!(quote.route.len(), 1);
        assert_eq!(quote.route[0].len(), 1);
        assert_eq!(quote.amount, "1000000000");
        assert_eq!(quote.block_number.as_ref().and_then(|b| b.parse::<u64>()), Some(19_000_000));

        let pool = quote.route[0][0].to_pool(0).unwrap();
        assert_eq!(pool.fee, 500);
        assert_eq!(pool.token0.decimals, 6);
        assert_eq!(pool.token1.symbol, "WETH");
        assert_eq!(pool.tick_current, Some(200_838));
        assert!(pool.sqrt_ratio_x96.is_some());
    }

    #[test]
    fn test_missing_fee_maps_to_zero() {
        let mut hop = hop_json(token_json(USDC, 6, "USDC"), token_json(WETH, 18, "WETH"), "500");
        hop.as_object_mut().unwrap().remove("fee");
        let hop: HopDescriptor = serde_json::from_value(hop).unwrap();
        assert_eq!(hop.to_pool(0).unwrap().fee, 0);
    }

    #[test]
    fn test_malformed_fee_is_missing_fee_tier() {
        let hop = hop_json(token_json(USDC, 6, "USDC"), token_json(WETH, 18, "WETH"), "0.3%");
        let hop: HopDescriptor = serde_json::from_value(hop).unwrap();
        assert!(matches!(hop.to_pool(3), Err(SwapError::MissingFeeTier { hop: 3 })));
    }

    #[test]
    fn test_out_of_range_pool_state_is_rejected() {
        let mut hop = hop_json(token_json(USDC, 6, "USDC"), token_json(WETH, 18, "WETH"), "500");
        hop["sqrtRatioX96"] = serde_json::json!("1");
        let hop: HopDescriptor = serde_json::from_value(hop).unwrap();
        assert!(matches!(hop.to_pool(0), Err(SwapError::InvalidRoute { .. })));
    }
}
