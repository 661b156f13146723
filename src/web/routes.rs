use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use std::sync::Arc;

use ethers::types::U256;

use crate::bootstrap::AppState;
use crate::engine::swap::{self, NativeLeg, SwapOptions};
use crate::engine::trade::{build_trade, Trade};
use crate::error::SwapError;
use crate::math::slippage;
use crate::math::tick_math::{self, PoolExchangeRate};
use crate::web::dto::{
    DepositAmountQuery, DepositAmountResponse, ErrorResponse, ExchangeRateQuery, SwapExecuteResponse,
    SwapParamsResponse, SwapRequest,
};

pub type ApiError = status::Custom<Json<ErrorResponse>>;

fn error_status(e: &SwapError) -> Status {
    match e {
        SwapError::SubmissionFailed(_) => Status::BadGateway,
        _ => Status::BadRequest,
    }
}

fn api_error(context: &str, e: SwapError) -> ApiError {
    log::error!("{} failed: {}", context, e);
    status::Custom(
        error_status(&e),
        Json(ErrorResponse { error: e.kind().to_string(), message: e.to_string() }),
    )
}

fn prepare(request: &SwapRequest, app_state: &AppState) -> Result<(Trade, SwapOptions, NativeLeg), SwapError> {
    let native = NativeLeg::from_flags(request.is_native_in, request.is_native_out)?;
    let slippage_bps = match &request.slippage_percent {
        Some(percent) => slippage::percent_to_basis_points(percent)?,
        None => app_state.default_slippage_bps,
    };
    let trade = build_trade(&request.quote, request.trade_type)?;
    swap::check_native_leg(&trade, native, app_state.wrapped_native)?;
    let opts = SwapOptions::new(
        app_state.swap_router,
        request.recipient,
        request.deadline_secs.unwrap_or(app_state.swap_deadline_secs),
        slippage_bps,
    );
    Ok((trade, opts, native))
}

#[post("/api/v1/swap/params", format = "json", data = "<request>")]
pub fn swap_params(
    request: Json<SwapRequest>,
    app_state: &State<Arc<AppState>>,
) -> Result<Json<SwapParamsResponse>, ApiError> {
    let (trade, opts, native) = prepare(&request, app_state).map_err(|e| api_error("swap params", e))?;
    let plan = swap::build_swap_call(&trade, &opts, native).map_err(|e| api_error("swap params", e))?;

    Ok(Json(SwapParamsResponse {
        target: format!("{:#x}", plan.call.target),
        function: plan.call.function_name().to_string(),
        selector: format!("0x{}", hex::encode(plan.call.call.selector())),
        calldata: format!("0x{}", hex::encode(plan.call.calldata().as_ref())),
        value: plan.call.value.to_string(),
        kind: plan.kind,
        native_leg: plan.native_leg,
        slippage_bps: opts.slippage_bps,
        bound_amount: plan.bound.to_string(),
        input_amount: trade.input_amount.raw.to_string(),
        output_amount: trade.output_amount.raw.to_string(),
        deadline: opts.deadline.to_string(),
    }))
}

#[post("/api/v1/swap/execute", format = "json", data = "<request>")]
pub async fn swap_execute(
    request: Json<SwapRequest>,
    app_state: &State<Arc<AppState>>,
) -> Result<Json<SwapExecuteResponse>, ApiError> {
    let signer = match &app_state.signer {
        Some(signer) => signer.clone(),
        None => {
            log::error!("swap execute requested but no signer is configured");
            return Err(status::Custom(
                Status::ServiceUnavailable,
                Json(ErrorResponse {
                    error: "EXECUTION_DISABLED".to_string(),
                    message: "no signer configured on this instance".to_string(),
                }),
            ));
        }
    };

    let (trade, opts, native) = prepare(&request, app_state).map_err(|e| api_error("swap execute", e))?;
    let submitted = swap::execute_swap_with_timeout(
        signer.as_ref(),
        &trade,
        &opts,
        native,
        &app_state.gas_policy,
        app_state.submit_timeout,
    )
    .await
    .map_err(|e| api_error("swap execute", e))?;

    Ok(Json(SwapExecuteResponse {
        tx_hash: format!("{:#x}", submitted.tx_hash),
        function: submitted.plan.call.function_name().to_string(),
    }))
}

#[get("/api/v1/pool/exchange-rate?<query..>")]
pub fn exchange_rate(query: ExchangeRateQuery) -> Result<Json<PoolExchangeRate>, ApiError> {
    let sqrt_price_x96 = U256::from_dec_str(query.sqrt_price_x96.trim())
        .map_err(|_| SwapError::InvalidPrice { input: query.sqrt_price_x96.clone() })
        .map_err(|e| api_error("exchange rate", e))?;
    tick_math::pool_exchange_rate(sqrt_price_x96, query.decimals0, query.decimals1)
        .map(Json)
        .map_err(|e| api_error("exchange rate", e))
}

#[get("/api/v1/pool/deposit-amount?<query..>")]
pub fn deposit_amount(query: DepositAmountQuery) -> Result<Json<DepositAmountResponse>, ApiError> {
    let result = tick_math::parse_price(&query.price).and_then(|price| match query.side.as_str() {
        "amount0" => tick_math::amount0_for_liquidity(&query.amount, price, query.decimals),
        "amount1" => tick_math::amount1_for_liquidity(&query.amount, price, query.decimals),
        other => Err(SwapError::invalid_amount(other, "side must be amount0 or amount1")),
    });
    result
        .map(|amount| Json(DepositAmountResponse { side: query.side.clone(), amount }))
        .map_err(|e| api_error("deposit amount", e))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

pub fn all() -> Vec<rocket::Route> {
    rocket::routes![swap_params, swap_execute, exchange_rate, deposit_amount, health]
}
