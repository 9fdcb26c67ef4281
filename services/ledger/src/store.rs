//! The ledger store: atomic balance mutations plus the append-only log
//!
//! `apply` is the only write path that moves money. It takes a set of
//! mutations and one transaction record, and commits them as a single
//! SQLite transaction. Every mutation re-verifies its own precondition
//! against the rows read inside that transaction, so a request validated
//! against stale state is rejected whole rather than half-committed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction};
use types::account::Account;
use types::errors::EscrowError;
use types::ids::{TradeId, UserId};
use types::trade::{Trade, TradeStatus};
use types::transaction::TransactionRecord;

use crate::row::{AccountRow, TradeRow, TransactionRow};

// ───────────────────────── Change description ─────────────────────────

/// One balance mutation inside an atomic ledger change
#[derive(Debug, Clone)]
pub enum LedgerMutation {
    /// Add to a wallet balance
    CreditWallet { user_id: UserId, amount: Decimal },
    /// Subtract from a wallet balance; rejected if it would go negative
    DebitWallet { user_id: UserId, amount: Decimal },
    /// Move `amount` into the trade's escrow and mark it escrow_deposited
    HoldInTrade { trade_id: TradeId, amount: Decimal },
    /// Drain the trade's escrow into the seller's wallet and complete the
    /// trade. The drained sum becomes the record amount.
    ReleaseEscrow { trade_id: TradeId, seller: UserId },
    /// Drain the trade's escrow back into the buyer's wallet and cancel
    /// the trade. The drained sum becomes the record amount.
    RefundEscrow { trade_id: TradeId, buyer: UserId },
}

/// A set of mutations plus exactly one transaction record, applied
/// all-or-nothing
#[derive(Debug, Clone)]
pub struct LedgerChange {
    pub mutations: Vec<LedgerMutation>,
    pub record: TransactionRecord,
}

impl LedgerChange {
    pub fn new(mutations: Vec<LedgerMutation>, record: TransactionRecord) -> Self {
        Self { mutations, record }
    }
}

// ───────────────────────── Store ─────────────────────────

/// Repository over the ledger database. Cheap to clone; all clones share
/// the underlying pool.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
}

impl LedgerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ───────────────────────── Accounts ─────────────────────────

    /// Insert an account row. A row that already exists is left untouched,
    /// which makes account opening idempotent.
    pub async fn create_account(&self, account: &Account) -> Result<(), EscrowError> {
        sqlx::query(
            "INSERT INTO accounts (user_id, wallet_balance, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id) DO NOTHING",
        )
        .bind(account.user_id.to_string())
        .bind(account.wallet_balance.to_string())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(EscrowError::storage)?;
        Ok(())
    }

    pub async fn fetch_account(&self, user_id: &UserId) -> Result<Account, EscrowError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT user_id, wallet_balance, created_at, updated_at
             FROM accounts WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(EscrowError::storage)?;

        match row {
            Some(row) => row.try_into(),
            None => Err(EscrowError::AccountNotFound {
                user_id: user_id.to_string(),
            }),
        }
    }

    // ───────────────────────── Trades ─────────────────────────

    pub async fn insert_trade(&self, trade: &Trade) -> Result<(), EscrowError> {
        sqlx::query(
            "INSERT INTO trades (trade_id, buyer_id, seller_id, quantity, unit,
                                 price_per_unit, total_amount, currency, status,
                                 escrow_amount, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(trade.trade_id.to_string())
        .bind(trade.buyer_id.to_string())
        .bind(trade.seller_id.to_string())
        .bind(trade.quantity.to_string())
        .bind(trade.unit.clone())
        .bind(trade.price_per_unit.to_string())
        .bind(trade.total_amount.to_string())
        .bind(trade.currency.clone())
        .bind(trade.status.as_str())
        .bind(trade.escrow_amount.to_string())
        .bind(trade.notes.clone())
        .bind(trade.created_at)
        .bind(trade.updated_at)
        .execute(&self.pool)
        .await
        .map_err(EscrowError::storage)?;
        Ok(())
    }

    pub async fn fetch_trade(&self, trade_id: &TradeId) -> Result<Trade, EscrowError> {
        let row = sqlx::query_as::<_, TradeRow>("SELECT * FROM trades WHERE trade_id = ?")
            .bind(trade_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(EscrowError::storage)?;

        match row {
            Some(row) => row.try_into(),
            None => Err(EscrowError::TradeNotFound {
                trade_id: trade_id.to_string(),
            }),
        }
    }

    /// All trades where the user is buyer or seller, newest first
    pub async fn trades_for_user(&self, user_id: &UserId) -> Result<Vec<Trade>, EscrowError> {
        let rows = sqlx::query_as::<_, TradeRow>(
            "SELECT * FROM trades
             WHERE buyer_id = ? OR seller_id = ?
             ORDER BY created_at DESC, trade_id DESC",
        )
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(EscrowError::storage)?;

        rows.into_iter().map(Trade::try_from).collect()
    }

    /// Move a trade's status from `from` to `to`, but only if the stored
    /// status is still `from`. A trade whose status moved since the
    /// caller read it is left untouched and the move is rejected as an
    /// invalid transition against the current status. Lifecycle legality
    /// is the caller's responsibility; this writes no transaction record.
    pub async fn set_trade_status(
        &self,
        trade_id: &TradeId,
        from: TradeStatus,
        to: TradeStatus,
        timestamp: DateTime<Utc>,
    ) -> Result<(), EscrowError> {
        let result = sqlx::query(
            "UPDATE trades SET status = ?, updated_at = ?
             WHERE trade_id = ? AND status = ?",
        )
        .bind(to.as_str())
        .bind(timestamp)
        .bind(trade_id.to_string())
        .bind(from.as_str())
        .execute(&self.pool)
        .await
        .map_err(EscrowError::storage)?;

        if result.rows_affected() == 0 {
            // Row missing or status changed since the caller's read; the
            // re-fetch tells the two apart
            let current = self.fetch_trade(trade_id).await?;
            return Err(EscrowError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(())
    }

    // ───────────────────────── Atomic apply ─────────────────────────

    /// Apply a ledger change as one SQLite transaction.
    ///
    /// Either every mutation lands together with the record, or the
    /// database is untouched. Returns the record as persisted; for
    /// `ReleaseEscrow` and `RefundEscrow` the amount is finalized from
    /// the escrow actually drained inside the transaction.
    pub async fn apply(&self, change: LedgerChange) -> Result<TransactionRecord, EscrowError> {
        let LedgerChange {
            mutations,
            mut record,
        } = change;
        let stamp = record.created_at;

        let mut tx = self.pool.begin().await.map_err(EscrowError::storage)?;

        for mutation in &mutations {
            match mutation {
                LedgerMutation::CreditWallet { user_id, amount } => {
                    let mut account = fetch_account_tx(&mut tx, user_id).await?;
                    account.credit(*amount)?;
                    update_account_tx(&mut tx, &account, stamp).await?;
                }
                LedgerMutation::DebitWallet { user_id, amount } => {
                    let mut account = fetch_account_tx(&mut tx, user_id).await?;
                    account.debit(*amount)?;
                    update_account_tx(&mut tx, &account, stamp).await?;
                }
                LedgerMutation::HoldInTrade { trade_id, amount } => {
                    let mut trade = fetch_trade_tx(&mut tx, trade_id).await?;
                    trade.hold(*amount)?;
                    update_trade_tx(&mut tx, &trade, stamp).await?;
                }
                LedgerMutation::ReleaseEscrow { trade_id, seller } => {
                    let mut trade = fetch_trade_tx(&mut tx, trade_id).await?;
                    let drained = trade.release()?;
                    let mut account = fetch_account_tx(&mut tx, seller).await?;
                    account.credit(drained)?;
                    update_trade_tx(&mut tx, &trade, stamp).await?;
                    update_account_tx(&mut tx, &account, stamp).await?;
                    record.amount = drained;
                }
                LedgerMutation::RefundEscrow { trade_id, buyer } => {
                    let mut trade = fetch_trade_tx(&mut tx, trade_id).await?;
                    let drained = trade.refund()?;
                    let mut account = fetch_account_tx(&mut tx, buyer).await?;
                    account.credit(drained)?;
                    update_trade_tx(&mut tx, &trade, stamp).await?;
                    update_account_tx(&mut tx, &account, stamp).await?;
                    record.amount = drained;
                }
            }
        }

        insert_record_tx(&mut tx, &record).await?;
        tx.commit().await.map_err(EscrowError::storage)?;

        tracing::debug!(
            record = %record.record_id,
            kind = record.kind.as_str(),
            amount = %record.amount,
            "ledger change committed"
        );
        Ok(record)
    }

    // ───────────────────────── Transaction log ─────────────────────────

    /// A user's records, newest first, capped at `limit`
    pub async fn transactions_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>, EscrowError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions
             WHERE user_id = ?
             ORDER BY created_at DESC, record_id DESC
             LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(EscrowError::storage)?;

        rows.into_iter().map(TransactionRecord::try_from).collect()
    }

    /// Every record written against a trade, in commit order
    pub async fn transactions_for_trade(
        &self,
        trade_id: &TradeId,
    ) -> Result<Vec<TransactionRecord>, EscrowError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions
             WHERE trade_id = ?
             ORDER BY created_at ASC, record_id ASC",
        )
        .bind(trade_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(EscrowError::storage)?;

        rows.into_iter().map(TransactionRecord::try_from).collect()
    }
}

// ───────────────────────── In-transaction helpers ─────────────────────────

async fn fetch_account_tx(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &UserId,
) -> Result<Account, EscrowError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT user_id, wallet_balance, created_at, updated_at
         FROM accounts WHERE user_id = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(&mut **tx)
    .await
    .map_err(EscrowError::storage)?;

    match row {
        Some(row) => row.try_into(),
        None => Err(EscrowError::AccountNotFound {
            user_id: user_id.to_string(),
        }),
    }
}

async fn fetch_trade_tx(
    tx: &mut Transaction<'_, Sqlite>,
    trade_id: &TradeId,
) -> Result<Trade, EscrowError> {
    let row = sqlx::query_as::<_, TradeRow>("SELECT * FROM trades WHERE trade_id = ?")
        .bind(trade_id.to_string())
        .fetch_optional(&mut **tx)
        .await
        .map_err(EscrowError::storage)?;

    match row {
        Some(row) => row.try_into(),
        None => Err(EscrowError::TradeNotFound {
            trade_id: trade_id.to_string(),
        }),
    }
}

async fn update_account_tx(
    tx: &mut Transaction<'_, Sqlite>,
    account: &Account,
    stamp: DateTime<Utc>,
) -> Result<(), EscrowError> {
    sqlx::query("UPDATE accounts SET wallet_balance = ?, updated_at = ? WHERE user_id = ?")
        .bind(account.wallet_balance.to_string())
        .bind(stamp)
        .bind(account.user_id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(EscrowError::storage)?;
    Ok(())
}

async fn update_trade_tx(
    tx: &mut Transaction<'_, Sqlite>,
    trade: &Trade,
    stamp: DateTime<Utc>,
) -> Result<(), EscrowError> {
    sqlx::query("UPDATE trades SET escrow_amount = ?, status = ?, updated_at = ? WHERE trade_id = ?")
        .bind(trade.escrow_amount.to_string())
        .bind(trade.status.as_str())
        .bind(stamp)
        .bind(trade.trade_id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(EscrowError::storage)?;
    Ok(())
}

async fn insert_record_tx(
    tx: &mut Transaction<'_, Sqlite>,
    record: &TransactionRecord,
) -> Result<(), EscrowError> {
    sqlx::query(
        "INSERT INTO transactions (record_id, user_id, trade_id, kind, amount,
                                   currency, status, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.record_id.to_string())
    .bind(record.user_id.to_string())
    .bind(record.trade_id.map(|id| id.to_string()))
    .bind(record.kind.as_str())
    .bind(record.amount.to_string())
    .bind(record.currency.clone())
    .bind(record.status.as_str())
    .bind(record.notes.clone())
    .bind(record.created_at)
    .execute(&mut **tx)
    .await
    .map_err(EscrowError::storage)?;
    Ok(())
}
