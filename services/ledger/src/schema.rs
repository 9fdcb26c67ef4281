//! Database initialization
//!
//! All money columns are stored as TEXT and parsed into `Decimal` at the
//! row boundary, so SQLite's numeric affinity can never round a balance.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use types::errors::EscrowError;

/// Open the ledger database and create any missing tables.
///
/// The pool is capped at one connection. SQLite allows a single writer at
/// a time, and funneling every caller through one connection makes each
/// `apply` transaction a serial unit without further locking. The
/// connection is never recycled, which also keeps `sqlite::memory:`
/// databases alive for the life of the pool.
pub async fn init_ledger(database_url: &str) -> Result<SqlitePool, EscrowError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(database_url)
        .await
        .map_err(EscrowError::storage)?;

    create_tables(&pool).await?;

    tracing::info!(url = database_url, "ledger database ready");
    Ok(pool)
}

async fn create_tables(pool: &SqlitePool) -> Result<(), EscrowError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS accounts (
            user_id TEXT PRIMARY KEY,
            wallet_balance TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(EscrowError::storage)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS trades (
            trade_id TEXT PRIMARY KEY,
            buyer_id TEXT NOT NULL,
            seller_id TEXT NOT NULL,
            quantity TEXT NOT NULL,
            unit TEXT,
            price_per_unit TEXT NOT NULL,
            total_amount TEXT NOT NULL,
            currency TEXT NOT NULL,
            status TEXT NOT NULL,
            escrow_amount TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(EscrowError::storage)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS transactions (
            record_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            trade_id TEXT,
            kind TEXT NOT NULL,
            amount TEXT NOT NULL,
            currency TEXT NOT NULL,
            status TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(EscrowError::storage)?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_trades_buyer ON trades (buyer_id)")
        .execute(pool)
        .await
        .map_err(EscrowError::storage)?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_trades_seller ON trades (seller_id)")
        .execute(pool)
        .await
        .map_err(EscrowError::storage)?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions (user_id, created_at)",
    )
    .execute(pool)
    .await
    .map_err(EscrowError::storage)?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_transactions_trade ON transactions (trade_id)")
        .execute(pool)
        .await
        .map_err(EscrowError::storage)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_tables() {
        let pool = init_ledger("sqlite::memory:").await.unwrap();
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(count.0 >= 3);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let pool = init_ledger("sqlite::memory:").await.unwrap();
        // Re-running the DDL against the same pool must not fail
        create_tables(&pool).await.unwrap();
    }
}
