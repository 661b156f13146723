// trade.rs - Route and Trade construction from a routing-service quote.

use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::engine::quote::QuoteResponse;
use crate::error::{Result, SwapError};
use crate::models::{Pool, Token, TokenAmount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    #[serde(rename = "EXACT_IN", alias = "exactIn", alias = "EXACT_INPUT")]
    ExactIn,
    #[serde(rename = "EXACT_OUT", alias = "exactOut", alias = "EXACT_OUTPUT")]
    ExactOut,
}

/// Chain of pools plus the token path derived from it.
///
/// `path.len() == pools.len() + 1`, `path[0] == input`, `path[last] == output`, and
/// `(path[i], path[i + 1])` are the two sides of `pools[i]` in swap order.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pools: Vec<Pool>,
    path: Vec<Token>,
}

impl Route {
    pub fn new(pools: Vec<Pool>, input: Token, output: Token) -> Result<Self> {
        if pools.is_empty() {
            return Err(SwapError::EmptyRoute);
        }

        let mut path = Vec::with_capacity(pools.len() + 1);
        path.push(input);
        for (i, pool) in pools.iter().enumerate() {
            let current = &path[path.len() - 1];
            let next = pool.other(current).cloned().ok_or_else(|| {
                SwapError::invalid_route(format!(
                    "pool {} ({} / {}) does not contain {}",
                    i, pool.token0.symbol, pool.token1.symbol, current
                ))
            })?;
            path.push(next);
        }

        let last = &path[path.len() - 1];
        if *last != output {
            return Err(SwapError::invalid_route(format!(
                "path ends at {} but output is {}",
                last, output
            )));
        }

        Ok(Self { pools, path })
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn path(&self) -> &[Token] {
        &self.path
    }

    pub fn input(&self) -> &Token {
        &self.path[0]
    }

    pub fn output(&self) -> &Token {
        &self.path[self.path.len() - 1]
    }

    pub fn hops(&self) -> usize {
        self.pools.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub route: Route,
    pub trade_type: TradeType,
    pub input_amount: TokenAmount,
    pub output_amount: TokenAmount,
}

impl Trade {
    /// Lowest acceptable output for `bps` of slippage.
    pub fn minimum_amount_out(&self, bps: u32) -> Result<U256> {
        Ok(self.output_amount.with_slippage_bps(bps, true)?.raw)
    }

    /// Highest acceptable input for `bps` of slippage.
    pub fn maximum_amount_in(&self, bps: u32) -> Result<U256> {
        Ok(self.input_amount.with_slippage_bps(bps, false)?.raw)
    }
}

/// Builds a `Trade` from the first (and only) route of `quote`.
///
/// For EXACT_OUT, `quote.quote` is the input side and `quote.amount` the output
/// side, matching the routing service's contract.
pub fn build_trade(quote: &QuoteResponse, trade_type: TradeType) -> Result<Trade> {
    let hops = match quote.route.as_slice() {
        [] => return Err(SwapError::EmptyRoute),
        [single] => single,
        many => return Err(SwapError::UnsupportedSplitRoute { routes: many.len() }),
    };
    let (first, last) = match (hops.first(), hops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SwapError::EmptyRoute),
    };

    let pools = hops
        .iter()
        .enumerate()
        .map(|(i, hop)| hop.to_pool(i))
        .collect::<Result<Vec<_>>>()?;
    let input = first.token_in.to_token()?;
    let output = last.token_out.to_token()?;
    let route = Route::new(pools, input.clone(), output.clone())?;

    let (input_amount, output_amount) = match trade_type {
        TradeType::ExactIn => (
            TokenAmount::from_raw_str(input, &quote.amount)?,
            TokenAmount::from_raw_str(output, &quote.quote)?,
        ),
        TradeType::ExactOut => (
            TokenAmount::from_raw_str(input, &quote.quote)?,
            TokenAmount::from_raw_str(output, &quote.amount)?,
        ),
    };

    log::debug!(
        "built {:?} trade over {} hop(s): {} -> {}",
        trade_type,
        route.hops(),
        input_amount,
        output_amount
    );

    Ok(Trade { route, trade_type, input_amount, output_amount })
}
