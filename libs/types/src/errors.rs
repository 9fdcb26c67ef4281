//! Error types for the escrow core
//!
//! Single flat taxonomy using thiserror. Every rejected operation maps to
//! exactly one of these kinds, and a rejection never leaves a partial
//! write behind.

use thiserror::Error;

/// Escrow core error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EscrowError {
    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("Escrow deposit exceeds trade total: held {held} of {total}, requested {requested}")]
    ExceedsTradeTotal {
        held: String,
        total: String,
        requested: String,
    },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("No escrowed funds to release")]
    NoFundsHeld,

    #[error("Account not found: {user_id}")]
    AccountNotFound { user_id: String },

    #[error("Trade not found: {trade_id}")]
    TradeNotFound { trade_id: String },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Balance arithmetic overflow")]
    Overflow,

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl EscrowError {
    /// Wrap a storage-layer failure. Keeps the enum cloneable by carrying
    /// the underlying error as text.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        EscrowError::Storage {
            message: err.to_string(),
        }
    }
}
