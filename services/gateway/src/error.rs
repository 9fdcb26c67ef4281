use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::prelude::EscrowError;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error(transparent)]
    Escrow(#[from] EscrowError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Maps a domain error to the HTTP status and machine-readable code
/// surfaced in the JSON body.
fn escrow_status(err: &EscrowError) -> (StatusCode, &'static str) {
    match err {
        EscrowError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
        EscrowError::InsufficientBalance { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_BALANCE"),
        EscrowError::ExceedsTradeTotal { .. } => (StatusCode::BAD_REQUEST, "EXCEEDS_TRADE_TOTAL"),
        EscrowError::NoFundsHeld => (StatusCode::BAD_REQUEST, "NO_FUNDS_HELD"),
        EscrowError::InvalidTransition { .. } => (StatusCode::BAD_REQUEST, "INVALID_TRANSITION"),
        EscrowError::PermissionDenied { .. } => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
        EscrowError::AccountNotFound { .. } | EscrowError::TradeNotFound { .. } => {
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        }
        EscrowError::Overflow | EscrowError::Storage { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            AppError::RateLimitExceeded(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, msg, "RATE_LIMIT_EXCEEDED")
            }
            AppError::Escrow(err) => {
                let (status, code) = escrow_status(&err);
                (status, err.to_string(), code)
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
            ),
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
