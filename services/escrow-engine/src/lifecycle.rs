//! Trade lifecycle rules
//!
//! The escrow operations drive status changes themselves (a hold marks
//! the trade escrow_deposited, a release completes it, a refund cancels
//! it). The rules here govern what else is allowed: whether a hold may
//! happen at all, and which manual status moves a participant may make.

use types::trade::TradeStatus;

/// Whether an escrow hold may be placed while the trade is in `status`.
///
/// Terminal trades accept no further funds; every other status does,
/// including in_progress and disputed top-ups.
pub fn hold_allowed(status: TradeStatus) -> bool {
    !status.is_terminal()
}

/// Whether a participant may manually move a trade from `from` to `to`.
///
/// Forward moves go one step at a time along
/// pending -> escrow_deposited -> in_progress -> completed. Cancelled and
/// disputed are reachable from any non-terminal status, and a disputed
/// trade can be resolved to completed or cancelled. Terminal statuses
/// admit no moves, and a status never moves to itself.
pub fn can_transition(from: TradeStatus, to: TradeStatus) -> bool {
    use TradeStatus::*;

    if from.is_terminal() || from == to {
        return false;
    }

    match (from, to) {
        (Pending, EscrowDeposited) => true,
        (EscrowDeposited, InProgress) => true,
        (InProgress, Completed) => true,
        (Disputed, Completed) => true,
        (_, Cancelled) | (_, Disputed) => true,
        _ => false,
    }
}
