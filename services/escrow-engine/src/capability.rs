//! Per-operation permissions on a trade
//!
//! Every trade-scoped operation names the one capability it needs, and
//! the grant tables below are the single place actor rules live. An
//! actor who is neither buyer nor seller holds no capabilities at all.

use types::errors::EscrowError;
use types::ids::UserId;
use types::trade::Trade;

/// A permission an actor can hold on a specific trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Move wallet funds into the trade's escrow
    HoldFunds,
    /// Pay held escrow out to the seller
    ReleaseFunds,
    /// Return held escrow to the buyer
    RefundFunds,
    /// Manually move the trade along the status graph
    UpdateStatus,
    /// Read the trade and its ledger
    ViewTrade,
}

impl Capability {
    /// Explanation used when the grant is missing
    fn denial_reason(&self) -> &'static str {
        match self {
            Capability::HoldFunds => "only the buyer may deposit into escrow",
            Capability::ReleaseFunds => "only the seller may release escrow",
            Capability::RefundFunds => "only a trade participant may refund escrow",
            Capability::UpdateStatus => "only a trade participant may change the trade status",
            Capability::ViewTrade => "only a trade participant may view this trade",
        }
    }
}

const BUYER_GRANTS: &[Capability] = &[
    Capability::HoldFunds,
    Capability::RefundFunds,
    Capability::UpdateStatus,
    Capability::ViewTrade,
];

const SELLER_GRANTS: &[Capability] = &[
    Capability::ReleaseFunds,
    Capability::RefundFunds,
    Capability::UpdateStatus,
    Capability::ViewTrade,
];

const NO_GRANTS: &[Capability] = &[];

/// Capabilities `actor` holds on `trade`
pub fn capabilities_for(actor: &UserId, trade: &Trade) -> &'static [Capability] {
    if *actor == trade.buyer_id {
        BUYER_GRANTS
    } else if *actor == trade.seller_id {
        SELLER_GRANTS
    } else {
        NO_GRANTS
    }
}

/// Require one capability; a missing grant is a permission failure
pub fn require(actor: &UserId, trade: &Trade, cap: Capability) -> Result<(), EscrowError> {
    if capabilities_for(actor, trade).contains(&cap) {
        Ok(())
    } else {
        Err(EscrowError::PermissionDenied {
            reason: cap.denial_reason().to_string(),
        })
    }
}
