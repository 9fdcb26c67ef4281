//! Escrow engine for the marketplace
//!
//! Validates every wallet and escrow operation against current ledger
//! state, then hands the ledger store one atomic change that both moves
//! the balances and appends the audit record. A rejected operation
//! leaves the ledger exactly as it found it.

pub mod capability;
pub mod engine;
pub mod lifecycle;

pub use engine::{EscrowEngine, NewTrade};
