// swap.rs - Chooses the router call for a Trade and hands it to the signer.
//
// Call shape is resolved once from two axes:
//   SwapKind  (SingleHop | MultiHop)       from the route
//   NativeLeg (None | In | Out)            from the caller
// and dispatched:
//   NativeLeg::None      -> bare swap call, gas estimated, value 0
//   NativeLeg::In / Out  -> multicall[swap, unwrapWETH9?], value = input if In

use std::time::Duration;

use ethers::types::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::chain::gas::{self, GasPolicy};
use crate::chain::path;
use crate::chain::router::{
    CallDescriptor, ExactInputParams, ExactInputSingleParams, ExactOutputParams, ExactOutputSingleParams,
    RouterCall,
};
use crate::chain::signer::SwapSigner;
use crate::engine::trade::{Trade, TradeType};
use crate::error::{Result, SwapError};
use crate::math::slippage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapKind {
    SingleHop,
    MultiHop,
}

impl SwapKind {
    pub fn of(trade: &Trade) -> Self {
        if trade.route.hops() == 1 {
            SwapKind::SingleHop
        } else {
            SwapKind::MultiHop
        }
    }
}

/// Which side of the trade is the chain's native currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeLeg {
    None,
    In,
    Out,
}

impl NativeLeg {
    pub fn from_flags(is_native_in: bool, is_native_out: bool) -> Result<Self> {
        match (is_native_in, is_native_out) {
            (false, false) => Ok(NativeLeg::None),
            (true, false) => Ok(NativeLeg::In),
            (false, true) => Ok(NativeLeg::Out),
            (true, true) => Err(SwapError::ConflictingNativeLegs),
        }
    }
}

/// Per-request settings for the router call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOptions {
    pub router: Address,
    pub recipient: Address,
    /// Unix timestamp after which the router rejects the call.
    pub deadline: U256,
    pub slippage_bps: u32,
}

impl SwapOptions {
    /// Options with a deadline `deadline_secs` from now.
    pub fn new(router: Address, recipient: Address, deadline_secs: u64, slippage_bps: u32) -> Self {
        Self { router, recipient, deadline: deadline_after(deadline_secs), slippage_bps }
    }
}

pub fn deadline_after(secs: u64) -> U256 {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    U256::from(now.saturating_add(secs))
}

/// The selected call plus the values it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPlan {
    pub kind: SwapKind,
    pub native_leg: NativeLeg,
    /// amountOutMinimum for EXACT_IN, amountInMaximum for EXACT_OUT.
    pub bound: U256,
    pub call: CallDescriptor,
}

fn swap_recipient(opts: &SwapOptions, native: NativeLeg) -> Address {
    match native {
        NativeLeg::Out => opts.router,
        NativeLeg::None | NativeLeg::In => opts.recipient,
    }
}

/// uint24 ceiling of the router's fee argument.
const MAX_FEE: u32 = 0xFF_FFFF;

fn check_fee_tiers(trade: &Trade) -> Result<()> {
    match trade.route.pools().iter().position(|p| p.fee == 0 || p.fee > MAX_FEE) {
        Some(hop) => Err(SwapError::MissingFeeTier { hop }),
        None => Ok(()),
    }
}

fn swap_call(trade: &Trade, kind: SwapKind, recipient: Address, bound: U256, deadline: U256) -> Result<RouterCall> {
    let token_in = trade.route.input().address;
    let token_out = trade.route.output().address;
    let call = match (kind, trade.trade_type) {
        (SwapKind::SingleHop, TradeType::ExactIn) => RouterCall::ExactInputSingle(ExactInputSingleParams {
            token_in,
            token_out,
            fee: trade.route.pools()[0].fee,
            recipient,
            deadline,
            amount_in: trade.input_amount.raw,
            amount_out_minimum: bound,
            sqrt_price_limit_x96: U256::zero(),
        }),
        (SwapKind::MultiHop, TradeType::ExactIn) => RouterCall::ExactInput(ExactInputParams {
            path: path::encode_route_forward(&trade.route)?,
            recipient,
            deadline,
            amount_in: trade.input_amount.raw,
            amount_out_minimum: bound,
        }),
        (SwapKind::SingleHop, TradeType::ExactOut) => RouterCall::ExactOutputSingle(ExactOutputSingleParams {
            token_in,
            token_out,
            fee: trade.route.pools()[0].fee,
            recipient,
            deadline,
            amount_out: trade.output_amount.raw,
            amount_in_maximum: bound,
            sqrt_price_limit_x96: U256::zero(),
        }),
        (SwapKind::MultiHop, TradeType::ExactOut) => RouterCall::ExactOutput(ExactOutputParams {
            path: path::encode_route_reversed(&trade.route)?,
            recipient,
            deadline,
            amount_out: trade.output_amount.raw,
            amount_in_maximum: bound,
        }),
    };
    Ok(call)
}

/// Builds the router call for `trade` without touching the network.
pub fn build_swap_call(trade: &Trade, opts: &SwapOptions, native: NativeLeg) -> Result<SwapPlan> {
    check_fee_tiers(trade)?;
    let kind = SwapKind::of(trade);
    let recipient = swap_recipient(opts, native);
    let bound = match trade.trade_type {
        TradeType::ExactIn => trade.minimum_amount_out(opts.slippage_bps)?,
        TradeType::ExactOut => trade.maximum_amount_in(opts.slippage_bps)?,
    };
    log::debug!(
        "{:?} {:?} native={:?} slippage={}bps bound={}",
        kind,
        trade.trade_type,
        native,
        opts.slippage_bps,
        bound
    );

    let swap = swap_call(trade, kind, recipient, bound, opts.deadline)?;
    let call = match native {
        NativeLeg::None => CallDescriptor::new(opts.router, swap, U256::zero()),
        NativeLeg::In => CallDescriptor::new(opts.router, RouterCall::Multicall(vec![swap]), trade.input_amount.raw),
        NativeLeg::Out => {
            let unwrap_base = match trade.trade_type {
                TradeType::ExactIn => trade.output_amount.raw,
                TradeType::ExactOut => trade.input_amount.raw,
            };
            let amount_minimum = slippage::bounded_amount(unwrap_base, opts.slippage_bps, true)?;
            let unwrap = RouterCall::UnwrapWeth9 { amount_minimum, recipient: opts.recipient };
            CallDescriptor::new(opts.router, RouterCall::Multicall(vec![swap, unwrap]), U256::zero())
        }
    };
    log::debug!("selected {} -> {:#x}, value {}", call.function_name(), call.target, call.value);

    Ok(SwapPlan { kind, native_leg: native, bound, call })
}

/// Native legs are only valid on the wrapped-native side of the route; the router
/// wraps and unwraps that token and nothing else.
pub fn check_native_leg(trade: &Trade, native: NativeLeg, wrapped_native: Address) -> Result<()> {
    let (side, token) = match native {
        NativeLeg::None => return Ok(()),
        NativeLeg::In => ("input", trade.route.input()),
        NativeLeg::Out => ("output", trade.route.output()),
    };
    if token.address != wrapped_native {
        return Err(SwapError::invalid_route(format!(
            "native {} needs the wrapped native token {:#x}, route has {}",
            side, wrapped_native, token
        )));
    }
    Ok(())
}

/// A submitted swap and the call that was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedSwap {
    pub tx_hash: TxHash,
    /// `plan.call.gas_limit` holds the limit actually sent, if any.
    pub plan: SwapPlan,
}

/// Builds, prices gas (non-native calls only) and submits the swap.
///
/// Submission errors come back as `SubmissionFailed` with the signer's error
/// untouched. Nothing is retried.
pub async fn execute_swap(
    signer: &dyn SwapSigner,
    trade: &Trade,
    opts: &SwapOptions,
    native: NativeLeg,
    gas_policy: &GasPolicy,
) -> Result<SubmittedSwap> {
    let mut plan = build_swap_call(trade, opts, native)?;

    if native == NativeLeg::None {
        let estimate = gas::estimate_gas_limit(signer, &plan.call, gas_policy).await;
        plan.call.gas_limit = Some(estimate.gas_limit);
    }

    let tx_hash = signer.submit(&plan.call).await.map_err(SwapError::SubmissionFailed)?;
    log::info!("submitted {} from {:#x}: {:#x}", plan.call.function_name(), signer.address(), tx_hash);
    Ok(SubmittedSwap { tx_hash, plan })
}

/// `execute_swap` bounded by `timeout`. On expiry the pending submission is dropped.
pub async fn execute_swap_with_timeout(
    signer: &dyn SwapSigner,
    trade: &Trade,
    opts: &SwapOptions,
    native: NativeLeg,
    gas_policy: &GasPolicy,
    timeout: Duration,
) -> Result<SubmittedSwap> {
    match tokio::time::timeout(timeout, execute_swap(signer, trade, opts, native, gas_policy)).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("swap submission abandoned after {:?}", timeout);
            Err(SwapError::SubmissionFailed(format!("timed out after {:?}", timeout).into()))
        }
    }
}
