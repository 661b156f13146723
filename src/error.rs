// error.rs - Failure taxonomy for trade construction, bounds and submission

use thiserror::Error;

/// Boxed error handed back by the wallet-signer / chain collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, SwapError>;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("slippage {percent}% is too high (max 99.99%)")]
    SlippageTooHigh { percent: String },

    #[error("slippage {percent}% has more than 2 decimal places")]
    SlippagePrecisionExceeded { percent: String },

    #[error("invalid slippage '{input}'")]
    InvalidSlippage { input: String },

    #[error("route has no pools")]
    EmptyRoute,

    #[error("invalid route: {reason}")]
    InvalidRoute { reason: String },

    #[error("quote contains {routes} split routes, only a single route can be executed")]
    UnsupportedSplitRoute { routes: usize },

    #[error("pool at hop {hop} has no fee tier")]
    MissingFeeTier { hop: usize },

    #[error("isNativeIn and isNativeOut cannot both be set")]
    ConflictingNativeLegs,

    #[error("bounded amount does not fit in 256 bits")]
    AmountOverflow,

    #[error("invalid price '{input}'")]
    InvalidPrice { input: String },

    #[error("invalid path: {reason}")]
    InvalidPath { reason: String },

    #[error("gas estimation failed: {0}")]
    GasEstimationFailed(#[source] BoxError),

    #[error("{0}")]
    SubmissionFailed(#[source] BoxError),
}

impl SwapError {
    pub(crate) fn invalid_amount(input: impl Into<String>, reason: impl Into<String>) -> Self {
        SwapError::InvalidAmount { input: input.into(), reason: reason.into() }
    }

    pub(crate) fn invalid_route(reason: impl Into<String>) -> Self {
        SwapError::InvalidRoute { reason: reason.into() }
    }

    /// Stable identifier used in HTTP error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SwapError::InvalidAmount { .. } => "INVALID_AMOUNT",
            SwapError::SlippageTooHigh { .. } => "SLIPPAGE_TOO_HIGH",
            SwapError::SlippagePrecisionExceeded { .. } => "SLIPPAGE_PRECISION_EXCEEDED",
            SwapError::InvalidSlippage { .. } => "INVALID_SLIPPAGE",
            SwapError::EmptyRoute => "EMPTY_ROUTE",
            SwapError::InvalidRoute { .. } => "INVALID_ROUTE",
            SwapError::UnsupportedSplitRoute { .. } => "UNSUPPORTED_SPLIT_ROUTE",
            SwapError::MissingFeeTier { .. } => "MISSING_FEE_TIER",
            SwapError::ConflictingNativeLegs => "CONFLICTING_NATIVE_LEGS",
            SwapError::AmountOverflow => "AMOUNT_OVERFLOW",
            SwapError::InvalidPrice { .. } => "INVALID_PRICE",
            SwapError::InvalidPath { .. } => "INVALID_PATH",
            SwapError::GasEstimationFailed(_) => "GAS_ESTIMATION_FAILED",
            SwapError::SubmissionFailed(_) => "SUBMISSION_FAILED",
        }
    }
}
