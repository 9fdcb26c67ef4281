//! Account and wallet balance types
//!
//! One account per user, one balance per account. Held escrow lives on
//! the trade rows, not here, so the wallet balance is exactly the amount
//! the user can still spend or withdraw.

use crate::errors::EscrowError;
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's wallet account
///
/// Invariant: wallet_balance >= 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub wallet_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with an empty wallet
    pub fn new(user_id: UserId, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id,
            wallet_balance: Decimal::ZERO,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Credit the wallet with overflow protection
    pub fn credit(&mut self, amount: Decimal) -> Result<(), EscrowError> {
        self.wallet_balance = self
            .wallet_balance
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        Ok(())
    }

    /// Debit the wallet. The balance may never go below zero.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), EscrowError> {
        if self.wallet_balance < amount {
            return Err(EscrowError::InsufficientBalance {
                required: amount.to_string(),
                available: self.wallet_balance.to_string(),
            });
        }
        self.wallet_balance = self
            .wallet_balance
            .checked_sub(amount)
            .ok_or(EscrowError::Overflow)?;
        Ok(())
    }

    /// Check balance invariant: wallet_balance >= 0
    pub fn check_invariant(&self) -> bool {
        self.wallet_balance >= Decimal::ZERO
    }
}
