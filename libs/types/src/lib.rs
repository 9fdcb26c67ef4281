//! Types library for the marketplace escrow core
//!
//! This library provides the core type definitions shared by the ledger
//! store, the escrow engine, and the HTTP gateway. All money amounts are
//! `rust_decimal::Decimal`; floats never touch a balance.
//!
//! # Modules
//! - `ids`: Unique identifiers (UserId, TradeId, RecordId)
//! - `account`: Wallet account and balance rules
//! - `trade`: Trade rows and lifecycle statuses
//! - `transaction`: Append-only transaction records
//! - `errors`: Error taxonomy

// Public modules
pub mod account;
pub mod errors;
pub mod ids;
pub mod trade;
pub mod transaction;

/// Currency label applied when a caller does not name one.
///
/// Currency is informational only; the core never converts between
/// currencies.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::account::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::trade::*;
    pub use crate::transaction::*;
    pub use crate::DEFAULT_CURRENCY;
}
