//! Append-only transaction records
//!
//! Every committed balance movement produces exactly one record; failed
//! operations produce none. The ledger table these land in is the audit
//! trail: rows are inserted, never updated or deleted.

use crate::ids::{RecordId, TradeId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a transaction record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// External funds credited to a wallet
    Deposit,
    /// Wallet funds paid out externally
    Withdrawal,
    /// Wallet funds moved into a trade's escrow
    EscrowHold,
    /// Held escrow paid out to the seller
    EscrowRelease,
    /// Held escrow returned to the buyer
    EscrowRefund,
}

impl TransactionKind {
    /// Storage and wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::EscrowHold => "escrow_hold",
            TransactionKind::EscrowRelease => "escrow_release",
            TransactionKind::EscrowRefund => "escrow_refund",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            "escrow_hold" => Some(TransactionKind::EscrowHold),
            "escrow_release" => Some(TransactionKind::EscrowRelease),
            "escrow_refund" => Some(TransactionKind::EscrowRefund),
            _ => None,
        }
    }

    /// Sign of this kind from the record owner's wallet perspective.
    ///
    /// Summing signed amounts over a user's records reconstructs their
    /// wallet balance exactly.
    pub fn sign(&self) -> Decimal {
        match self {
            TransactionKind::Deposit
            | TransactionKind::EscrowRelease
            | TransactionKind::EscrowRefund => Decimal::ONE,
            TransactionKind::Withdrawal | TransactionKind::EscrowHold => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome state of a transaction record
///
/// The core only ever writes `Completed` rows. `Pending` and `Failed`
/// exist for external settlement flows that reconcile asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// One row of the append-only ledger
///
/// `user_id` is the wallet the record is written against: the buyer for
/// deposits, withdrawals, holds and refunds, the seller for releases.
/// `amount` is always positive; direction comes from the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub record_id: RecordId,
    pub user_id: UserId,
    pub trade_id: Option<TradeId>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a completed record. A record only exists because its
    /// operation committed, so `Completed` is the only status written here.
    pub fn new(
        user_id: UserId,
        trade_id: Option<TradeId>,
        kind: TransactionKind,
        amount: Decimal,
        currency: String,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id: RecordId::new(),
            user_id,
            trade_id,
            kind,
            amount,
            currency,
            status: TransactionStatus::Completed,
            notes,
            created_at,
        }
    }

    /// Signed value from the record owner's wallet perspective
    pub fn signed_amount(&self) -> Decimal {
        self.kind.sign() * self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: TransactionKind, amount: u64) -> TransactionRecord {
        TransactionRecord::new(
            UserId::new(),
            Some(TradeId::new()),
            kind,
            Decimal::from(amount),
            "INR".to_string(),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_record_created_completed() {
        let record = record(TransactionKind::Deposit, 100);
        assert_eq!(record.status, TransactionStatus::Completed);
        assert_eq!(record.amount, Decimal::from(100));
    }

    #[test]
    fn test_signed_amounts() {
        assert_eq!(
            record(TransactionKind::Deposit, 100).signed_amount(),
            Decimal::from(100)
        );
        assert_eq!(
            record(TransactionKind::Withdrawal, 100).signed_amount(),
            Decimal::from(-100)
        );
        assert_eq!(
            record(TransactionKind::EscrowHold, 250).signed_amount(),
            Decimal::from(-250)
        );
        assert_eq!(
            record(TransactionKind::EscrowRelease, 250).signed_amount(),
            Decimal::from(250)
        );
        assert_eq!(
            record(TransactionKind::EscrowRefund, 250).signed_amount(),
            Decimal::from(250)
        );
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(TransactionKind::EscrowHold.as_str(), "escrow_hold");
        assert_eq!(
            TransactionKind::parse("escrow_release"),
            Some(TransactionKind::EscrowRelease)
        );
        assert_eq!(TransactionKind::parse("bogus"), None);

        let json = serde_json::to_string(&TransactionKind::EscrowRefund).unwrap();
        assert_eq!(json, "\"escrow_refund\"");
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let record = record(TransactionKind::Deposit, 100);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"amount\":\"100\""));
    }
}
