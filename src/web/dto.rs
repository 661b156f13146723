use ethers::types::Address;
use rocket::serde::{Deserialize, Serialize};

use crate::engine::quote::QuoteResponse;
use crate::engine::swap::{NativeLeg, SwapKind};
use crate::engine::trade::TradeType;

/// Body of both swap endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub quote: QuoteResponse,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    /// Percent string ("0.5"); the configured default when absent.
    pub slippage_percent: Option<String>,
    pub recipient: Address,
    #[serde(default)]
    pub is_native_in: bool,
    #[serde(default)]
    pub is_native_out: bool,
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapParamsResponse {
    pub target: String,
    pub function: String,
    pub selector: String,
    pub calldata: String,
    pub value: String,
    pub kind: SwapKind,
    pub native_leg: NativeLeg,
    pub slippage_bps: u32,
    pub bound_amount: String,
    pub input_amount: String,
    pub output_amount: String,
    pub deadline: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapExecuteResponse {
    pub tx_hash: String,
    pub function: String,
}

#[derive(Debug, Deserialize, rocket::FromForm)]
pub struct ExchangeRateQuery {
    pub sqrt_price_x96: String,
    pub decimals0: u8,
    pub decimals1: u8,
}

#[derive(Debug, Deserialize, rocket::FromForm)]
pub struct DepositAmountQuery {
    /// Which amount to derive: "amount0" (from an amount1) or "amount1" (from an amount0).
    pub side: String,
    pub amount: String,
    pub price: String,
    /// Decimals of the derived side.
    pub decimals: u8,
}

#[derive(Debug, Serialize)]
pub struct DepositAmountResponse {
    pub side: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
