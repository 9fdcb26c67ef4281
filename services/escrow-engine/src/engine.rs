//! Escrow engine: wallet funding, escrow holds, releases, and refunds
//!
//! Implements the five money-moving operations plus the trade workflow
//! around them:
//! - Wallet deposit and withdrawal
//! - Escrow hold (buyer funds locked against a trade)
//! - Escrow release (held funds paid to the seller)
//! - Escrow refund (held funds returned to the buyer)
//! - Trade creation, manual status moves, and read queries
//!
//! Every operation validates first and mutates second. The mutation is a
//! single [`LedgerChange`] handed to the store, so the balance movement
//! and its audit record commit together or not at all. The store
//! re-verifies each precondition inside the transaction; the checks here
//! exist to reject bad requests before anything is staged.

use chrono::Utc;
use ledger::{LedgerChange, LedgerMutation, LedgerStore};
use rust_decimal::Decimal;
use types::account::Account;
use types::errors::EscrowError;
use types::ids::{TradeId, UserId};
use types::trade::{Trade, TradeStatus};
use types::transaction::{TransactionKind, TransactionRecord};
use types::DEFAULT_CURRENCY;

use crate::capability::{self, Capability};
use crate::lifecycle;

/// Parameters for opening a trade against a listing
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub seller_id: UserId,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub price_per_unit: Decimal,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

/// Coordinates every financial operation against the ledger store.
///
/// All state-changing operations follow the same order:
/// 1. Amount validation
/// 2. Row existence (trade, then account)
/// 3. Capability of the acting user
/// 4. Balance and escrow preconditions
/// 5. One atomic ledger change
#[derive(Debug, Clone)]
pub struct EscrowEngine {
    ledger: LedgerStore,
}

impl EscrowEngine {
    pub fn new(ledger: LedgerStore) -> Self {
        Self { ledger }
    }

    // ───────────────────────── Accounts ─────────────────────────

    /// Open a wallet for a user. Idempotent: opening an account that
    /// already exists returns the existing row unchanged.
    pub async fn open_account(&self, user_id: UserId) -> Result<Account, EscrowError> {
        let account = Account::new(user_id, Utc::now());
        self.ledger.create_account(&account).await?;

        let account = self.ledger.fetch_account(&user_id).await?;
        tracing::info!(user = %user_id, "account ready");
        Ok(account)
    }

    /// Current wallet state for a user.
    pub async fn account(&self, user_id: &UserId) -> Result<Account, EscrowError> {
        self.ledger.fetch_account(user_id).await
    }

    // ───────────────────────── Wallet operations ─────────────────────────

    /// Credit a wallet from an external source.
    pub async fn deposit_to_wallet(
        &self,
        user_id: UserId,
        amount: Decimal,
        notes: Option<String>,
    ) -> Result<TransactionRecord, EscrowError> {
        ensure_positive(amount)?;
        self.ledger.fetch_account(&user_id).await?;

        let record = TransactionRecord::new(
            user_id,
            None,
            TransactionKind::Deposit,
            amount,
            DEFAULT_CURRENCY.to_string(),
            Some(notes.unwrap_or_else(|| "Manual deposit".to_string())),
            Utc::now(),
        );
        let change = LedgerChange::new(
            vec![LedgerMutation::CreditWallet { user_id, amount }],
            record,
        );
        let record = self.ledger.apply(change).await?;

        tracing::info!(user = %user_id, amount = %amount, "wallet deposit");
        Ok(record)
    }

    /// Debit a wallet toward an external destination.
    pub async fn withdraw_from_wallet(
        &self,
        user_id: UserId,
        amount: Decimal,
        notes: Option<String>,
    ) -> Result<TransactionRecord, EscrowError> {
        ensure_positive(amount)?;
        let account = self.ledger.fetch_account(&user_id).await?;
        if account.wallet_balance < amount {
            return Err(EscrowError::InsufficientBalance {
                required: amount.to_string(),
                available: account.wallet_balance.to_string(),
            });
        }

        let record = TransactionRecord::new(
            user_id,
            None,
            TransactionKind::Withdrawal,
            amount,
            DEFAULT_CURRENCY.to_string(),
            Some(notes.unwrap_or_else(|| "Manual withdrawal".to_string())),
            Utc::now(),
        );
        let change = LedgerChange::new(
            vec![LedgerMutation::DebitWallet { user_id, amount }],
            record,
        );
        let record = self.ledger.apply(change).await?;

        tracing::info!(user = %user_id, amount = %amount, "wallet withdrawal");
        Ok(record)
    }

    // ───────────────────────── Escrow operations ─────────────────────────

    /// Hold buyer funds in a trade's escrow.
    ///
    /// Only the buyer may hold, the trade must not be terminal, the
    /// buyer's wallet must cover the amount, and the held total may never
    /// pass the trade total. Repeated holds accumulate.
    pub async fn deposit_to_trade(
        &self,
        actor: UserId,
        trade_id: TradeId,
        amount: Decimal,
    ) -> Result<TransactionRecord, EscrowError> {
        ensure_positive(amount)?;
        let trade = self.ledger.fetch_trade(&trade_id).await?;
        capability::require(&actor, &trade, Capability::HoldFunds)?;
        if !lifecycle::hold_allowed(trade.status) {
            return Err(EscrowError::InvalidTransition {
                from: trade.status.as_str().to_string(),
                to: TradeStatus::EscrowDeposited.as_str().to_string(),
            });
        }

        let account = self.ledger.fetch_account(&actor).await?;
        if account.wallet_balance < amount {
            return Err(EscrowError::InsufficientBalance {
                required: amount.to_string(),
                available: account.wallet_balance.to_string(),
            });
        }
        let held_after = trade
            .escrow_amount
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        if held_after > trade.total_amount {
            return Err(EscrowError::ExceedsTradeTotal {
                held: trade.escrow_amount.to_string(),
                total: trade.total_amount.to_string(),
                requested: amount.to_string(),
            });
        }

        let record = TransactionRecord::new(
            actor,
            Some(trade_id),
            TransactionKind::EscrowHold,
            amount,
            trade.currency.clone(),
            Some(format!("Escrow deposit for trade {trade_id}")),
            Utc::now(),
        );
        let change = LedgerChange::new(
            vec![
                LedgerMutation::DebitWallet {
                    user_id: actor,
                    amount,
                },
                LedgerMutation::HoldInTrade { trade_id, amount },
            ],
            record,
        );
        let record = self.ledger.apply(change).await?;

        tracing::info!(trade = %trade_id, buyer = %actor, amount = %amount, "escrow hold");
        Ok(record)
    }

    /// Pay a trade's held escrow out to the seller, completing the trade.
    ///
    /// Gated on held funds, not on status: a disputed or in-progress
    /// trade with escrow can still be released.
    pub async fn release_to_seller(
        &self,
        actor: UserId,
        trade_id: TradeId,
    ) -> Result<TransactionRecord, EscrowError> {
        let trade = self.ledger.fetch_trade(&trade_id).await?;
        capability::require(&actor, &trade, Capability::ReleaseFunds)?;
        if trade.escrow_amount <= Decimal::ZERO {
            return Err(EscrowError::NoFundsHeld);
        }
        self.ledger.fetch_account(&trade.seller_id).await?;

        let record = TransactionRecord::new(
            trade.seller_id,
            Some(trade_id),
            TransactionKind::EscrowRelease,
            trade.escrow_amount,
            trade.currency.clone(),
            Some(format!("Escrow released for trade {trade_id}")),
            Utc::now(),
        );
        let change = LedgerChange::new(
            vec![LedgerMutation::ReleaseEscrow {
                trade_id,
                seller: trade.seller_id,
            }],
            record,
        );
        let record = self.ledger.apply(change).await?;

        tracing::info!(trade = %trade_id, seller = %trade.seller_id, amount = %record.amount, "escrow released");
        Ok(record)
    }

    /// Return a trade's held escrow to the buyer, cancelling the trade.
    ///
    /// Either party may trigger the refund; the funds always go back to
    /// the buyer's wallet.
    pub async fn refund_to_buyer(
        &self,
        actor: UserId,
        trade_id: TradeId,
    ) -> Result<TransactionRecord, EscrowError> {
        let trade = self.ledger.fetch_trade(&trade_id).await?;
        capability::require(&actor, &trade, Capability::RefundFunds)?;
        if trade.escrow_amount <= Decimal::ZERO {
            return Err(EscrowError::NoFundsHeld);
        }
        self.ledger.fetch_account(&trade.buyer_id).await?;

        let record = TransactionRecord::new(
            trade.buyer_id,
            Some(trade_id),
            TransactionKind::EscrowRefund,
            trade.escrow_amount,
            trade.currency.clone(),
            Some(format!("Escrow refunded for trade {trade_id}")),
            Utc::now(),
        );
        let change = LedgerChange::new(
            vec![LedgerMutation::RefundEscrow {
                trade_id,
                buyer: trade.buyer_id,
            }],
            record,
        );
        let record = self.ledger.apply(change).await?;

        tracing::info!(trade = %trade_id, buyer = %trade.buyer_id, amount = %record.amount, "escrow refunded");
        Ok(record)
    }

    // ───────────────────────── Trade workflow ─────────────────────────

    /// Create a pending trade on behalf of a buyer.
    ///
    /// Quantity and price must be positive and the seller must be a
    /// different user; the total is fixed here and never recomputed. No
    /// funds move until the buyer deposits.
    pub async fn create_trade(
        &self,
        buyer_id: UserId,
        params: NewTrade,
    ) -> Result<Trade, EscrowError> {
        if params.quantity <= Decimal::ZERO || params.price_per_unit <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount);
        }
        if buyer_id == params.seller_id {
            return Err(EscrowError::PermissionDenied {
                reason: "cannot trade with yourself".to_string(),
            });
        }

        let trade = Trade::new(
            buyer_id,
            params.seller_id,
            params.quantity,
            params.unit,
            params.price_per_unit,
            params
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            params.notes,
            Utc::now(),
        )?;
        self.ledger.insert_trade(&trade).await?;

        tracing::info!(
            trade = %trade.trade_id,
            buyer = %trade.buyer_id,
            seller = %trade.seller_id,
            total = %trade.total_amount,
            "trade created"
        );
        Ok(trade)
    }

    /// Manually move a trade along the status graph.
    ///
    /// The write lands only if the status is still the one the transition
    /// was validated against; a release or refund committing in between
    /// surfaces as an invalid transition instead of being overwritten.
    /// Writes no transaction record; money moves only through the escrow
    /// operations, whatever the status says.
    pub async fn update_trade_status(
        &self,
        actor: UserId,
        trade_id: TradeId,
        new_status: TradeStatus,
    ) -> Result<Trade, EscrowError> {
        let trade = self.ledger.fetch_trade(&trade_id).await?;
        capability::require(&actor, &trade, Capability::UpdateStatus)?;
        if !lifecycle::can_transition(trade.status, new_status) {
            return Err(EscrowError::InvalidTransition {
                from: trade.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        self.ledger
            .set_trade_status(&trade_id, trade.status, new_status, Utc::now())
            .await?;

        tracing::info!(
            trade = %trade_id,
            from = trade.status.as_str(),
            to = new_status.as_str(),
            "trade status updated"
        );
        self.ledger.fetch_trade(&trade_id).await
    }

    // ───────────────────────── Read surface ─────────────────────────

    /// Trade detail, restricted to its participants.
    pub async fn trade_for_participant(
        &self,
        actor: &UserId,
        trade_id: &TradeId,
    ) -> Result<Trade, EscrowError> {
        let trade = self.ledger.fetch_trade(trade_id).await?;
        capability::require(actor, &trade, Capability::ViewTrade)?;
        Ok(trade)
    }

    /// All trades the user participates in, newest first.
    pub async fn trades_for(&self, user_id: &UserId) -> Result<Vec<Trade>, EscrowError> {
        self.ledger.trades_for_user(user_id).await
    }

    /// A user's transaction history, newest first, capped at `limit`.
    pub async fn account_statement(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>, EscrowError> {
        self.ledger.transactions_for_user(user_id, limit).await
    }

    /// Every record written against a trade, in commit order, restricted
    /// to its participants.
    pub async fn trade_ledger(
        &self,
        actor: &UserId,
        trade_id: &TradeId,
    ) -> Result<Vec<TransactionRecord>, EscrowError> {
        let trade = self.ledger.fetch_trade(trade_id).await?;
        capability::require(actor, &trade, Capability::ViewTrade)?;
        self.ledger.transactions_for_trade(trade_id).await
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), EscrowError> {
    if amount <= Decimal::ZERO {
        return Err(EscrowError::InvalidAmount);
    }
    Ok(())
}
