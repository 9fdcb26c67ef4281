//! Trade and trade lifecycle types
//!
//! A trade pins a buyer, a seller, and a fixed total. Escrow held for
//! the trade accumulates on the row itself and is drained in full by a
//! release or refund.

use crate::errors::EscrowError;
use crate::ids::{TradeId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade lifecycle status
///
/// `Completed` and `Cancelled` are terminal; a terminal trade never
/// changes status again and accepts no further escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// Trade created, no escrow held yet
    Pending,
    /// Buyer funds held in escrow
    EscrowDeposited,
    /// Goods in transit or under inspection
    InProgress,
    /// Escrow released to the seller (terminal)
    Completed,
    /// Trade abandoned; any escrow refunded to the buyer (terminal)
    Cancelled,
    /// Parties disagree; awaiting manual resolution
    Disputed,
}

impl TradeStatus {
    /// Terminal statuses admit no further mutation
    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Completed | TradeStatus::Cancelled)
    }

    /// Storage and wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::EscrowDeposited => "escrow_deposited",
            TradeStatus::InProgress => "in_progress",
            TradeStatus::Completed => "completed",
            TradeStatus::Cancelled => "cancelled",
            TradeStatus::Disputed => "disputed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TradeStatus::Pending),
            "escrow_deposited" => Some(TradeStatus::EscrowDeposited),
            "in_progress" => Some(TradeStatus::InProgress),
            "completed" => Some(TradeStatus::Completed),
            "cancelled" => Some(TradeStatus::Cancelled),
            "disputed" => Some(TradeStatus::Disputed),
            _ => None,
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A trade between a buyer and a seller
///
/// `total_amount` is fixed at creation (quantity × price_per_unit) and
/// never recomputed. Invariant: 0 <= escrow_amount <= total_amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,

    // Participants
    pub buyer_id: UserId,
    pub seller_id: UserId,

    // Commercial terms, fixed at creation
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub price_per_unit: Decimal,
    pub total_amount: Decimal,
    pub currency: String,

    // Escrow state
    pub status: TradeStatus,
    pub escrow_amount: Decimal,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    /// Create a pending trade. The total is computed here, once.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buyer_id: UserId,
        seller_id: UserId,
        quantity: Decimal,
        unit: Option<String>,
        price_per_unit: Decimal,
        currency: String,
        notes: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, EscrowError> {
        let total_amount = quantity
            .checked_mul(price_per_unit)
            .ok_or(EscrowError::Overflow)?;

        Ok(Self {
            trade_id: TradeId::new(),
            buyer_id,
            seller_id,
            quantity,
            unit,
            price_per_unit,
            total_amount,
            currency,
            status: TradeStatus::Pending,
            escrow_amount: Decimal::ZERO,
            notes,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Hold further funds in escrow
    ///
    /// Refused on a terminal trade, and refused when the held total would
    /// pass the trade total. On success the trade is escrow_deposited,
    /// whatever status it held before.
    pub fn hold(&mut self, amount: Decimal) -> Result<(), EscrowError> {
        if self.status.is_terminal() {
            return Err(EscrowError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: TradeStatus::EscrowDeposited.as_str().to_string(),
            });
        }
        let next = self
            .escrow_amount
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        if next > self.total_amount {
            return Err(EscrowError::ExceedsTradeTotal {
                held: self.escrow_amount.to_string(),
                total: self.total_amount.to_string(),
                requested: amount.to_string(),
            });
        }

        self.escrow_amount = next;
        self.status = TradeStatus::EscrowDeposited;
        Ok(())
    }

    /// Drain all held escrow toward the seller, completing the trade.
    /// Returns the drained amount.
    pub fn release(&mut self) -> Result<Decimal, EscrowError> {
        if self.escrow_amount <= Decimal::ZERO {
            return Err(EscrowError::NoFundsHeld);
        }
        let drained = self.escrow_amount;
        self.escrow_amount = Decimal::ZERO;
        self.status = TradeStatus::Completed;
        Ok(drained)
    }

    /// Drain all held escrow back toward the buyer, cancelling the trade.
    /// Returns the drained amount.
    pub fn refund(&mut self) -> Result<Decimal, EscrowError> {
        if self.escrow_amount <= Decimal::ZERO {
            return Err(EscrowError::NoFundsHeld);
        }
        let drained = self.escrow_amount;
        self.escrow_amount = Decimal::ZERO;
        self.status = TradeStatus::Cancelled;
        Ok(drained)
    }

    /// Check if a user is a party to this trade
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.buyer_id == *user_id || self.seller_id == *user_id
    }

    /// Check escrow invariant: 0 <= escrow_amount <= total_amount
    pub fn check_invariant(&self) -> bool {
        self.escrow_amount >= Decimal::ZERO && self.escrow_amount <= self.total_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn trade(quantity: &str, price: &str) -> Trade {
        Trade::new(
            UserId::new(),
            UserId::new(),
            Decimal::from_str(quantity).unwrap(),
            Some("kg".to_string()),
            Decimal::from_str(price).unwrap(),
            "INR".to_string(),
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_trade_creation_computes_total() {
        let trade = trade("5", "100");
        assert_eq!(trade.total_amount, Decimal::from(500));
        assert_eq!(trade.status, TradeStatus::Pending);
        assert_eq!(trade.escrow_amount, Decimal::ZERO);
        assert!(trade.check_invariant());
    }

    #[test]
    fn test_trade_creation_fractional_quantity() {
        let trade = trade("2.5", "100.50");
        assert_eq!(trade.total_amount, Decimal::from_str("251.250").unwrap());
    }

    #[test]
    fn test_hold_accumulates_and_marks_deposited() {
        let mut trade = trade("5", "100");
        trade.hold(Decimal::from(200)).unwrap();
        trade.hold(Decimal::from(300)).unwrap();

        assert_eq!(trade.escrow_amount, Decimal::from(500));
        assert_eq!(trade.status, TradeStatus::EscrowDeposited);
        assert!(trade.check_invariant());
    }

    #[test]
    fn test_hold_rejects_over_commitment() {
        let mut trade = trade("5", "100");
        trade.hold(Decimal::from(400)).unwrap();

        let err = trade.hold(Decimal::from(200)).unwrap_err();
        assert_eq!(
            err,
            EscrowError::ExceedsTradeTotal {
                held: "400".to_string(),
                total: "500".to_string(),
                requested: "200".to_string(),
            }
        );
        // Rejected hold leaves the trade untouched
        assert_eq!(trade.escrow_amount, Decimal::from(400));
        assert_eq!(trade.status, TradeStatus::EscrowDeposited);
    }

    #[test]
    fn test_hold_rejects_terminal_trade() {
        let mut trade = trade("5", "100");
        trade.hold(Decimal::from(500)).unwrap();
        trade.release().unwrap();

        let err = trade.hold(Decimal::from(100)).unwrap_err();
        assert!(matches!(err, EscrowError::InvalidTransition { .. }));
    }

    #[test]
    fn test_release_drains_escrow_and_completes() {
        let mut trade = trade("5", "100");
        trade.hold(Decimal::from(500)).unwrap();

        let drained = trade.release().unwrap();
        assert_eq!(drained, Decimal::from(500));
        assert_eq!(trade.escrow_amount, Decimal::ZERO);
        assert_eq!(trade.status, TradeStatus::Completed);
        assert!(trade.status.is_terminal());
    }

    #[test]
    fn test_refund_drains_escrow_and_cancels() {
        let mut trade = trade("5", "100");
        trade.hold(Decimal::from(300)).unwrap();

        let drained = trade.refund().unwrap();
        assert_eq!(drained, Decimal::from(300));
        assert_eq!(trade.escrow_amount, Decimal::ZERO);
        assert_eq!(trade.status, TradeStatus::Cancelled);
    }

    #[test]
    fn test_release_without_escrow_rejected() {
        let mut trade = trade("5", "100");
        assert_eq!(trade.release().unwrap_err(), EscrowError::NoFundsHeld);
        assert_eq!(trade.status, TradeStatus::Pending);
    }

    #[test]
    fn test_double_release_rejected() {
        let mut trade = trade("5", "100");
        trade.hold(Decimal::from(500)).unwrap();
        trade.release().unwrap();

        assert_eq!(trade.release().unwrap_err(), EscrowError::NoFundsHeld);
    }

    #[test]
    fn test_is_participant() {
        let trade = trade("5", "100");
        assert!(trade.is_participant(&trade.buyer_id));
        assert!(trade.is_participant(&trade.seller_id));
        assert!(!trade.is_participant(&UserId::new()));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(TradeStatus::EscrowDeposited.as_str(), "escrow_deposited");
        assert_eq!(
            TradeStatus::parse("in_progress"),
            Some(TradeStatus::InProgress)
        );
        assert_eq!(TradeStatus::parse("bogus"), None);

        let json = serde_json::to_string(&TradeStatus::EscrowDeposited).unwrap();
        assert_eq!(json, "\"escrow_deposited\"");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(TradeStatus::Completed.is_terminal());
        assert!(TradeStatus::Cancelled.is_terminal());
        assert!(!TradeStatus::Pending.is_terminal());
        assert!(!TradeStatus::Disputed.is_terminal());
        assert!(!TradeStatus::InProgress.is_terminal());
    }

    proptest! {
        #[test]
        fn prop_escrow_never_exceeds_total(amounts in prop::collection::vec(1u64..2000, 1..20)) {
            let mut trade = trade("50", "100");
            for raw in amounts {
                // Over-committing holds are rejected; either way the invariant holds
                let _ = trade.hold(Decimal::from(raw));
                prop_assert!(trade.check_invariant());
            }
        }
    }
}
