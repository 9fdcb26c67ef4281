//! Ledger store for the marketplace escrow core
//!
//! Owns durable state: wallet balances, per-trade escrow amounts, and the
//! append-only transaction log. The one write path that moves money is
//! [`store::LedgerStore::apply`], which commits a set of balance
//! mutations together with exactly one transaction record, or nothing.

pub mod row;
pub mod schema;
pub mod store;

pub use schema::init_ledger;
pub use store::{LedgerChange, LedgerMutation, LedgerStore};
