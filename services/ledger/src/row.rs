//! Raw row structs mapped straight out of SQLite
//!
//! Ids, amounts, statuses and kinds live in their TEXT form here and are
//! parsed into domain types by the `TryFrom` conversions. A row that
//! fails to parse is corrupt storage, not caller error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use types::account::Account;
use types::errors::EscrowError;
use types::ids::{RecordId, TradeId, UserId};
use types::trade::{Trade, TradeStatus};
use types::transaction::{TransactionKind, TransactionRecord, TransactionStatus};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountRow {
    pub user_id: String,
    pub wallet_balance: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = EscrowError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            user_id: UserId::from_uuid(parse_uuid(&row.user_id)?),
            wallet_balance: parse_decimal(&row.wallet_balance)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeRow {
    pub trade_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub quantity: String,
    pub unit: Option<String>,
    pub price_per_unit: String,
    pub total_amount: String,
    pub currency: String,
    pub status: String,
    pub escrow_amount: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TradeRow> for Trade {
    type Error = EscrowError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let status = TradeStatus::parse(&row.status)
            .ok_or_else(|| EscrowError::storage(format!("unknown trade status {:?}", row.status)))?;

        Ok(Trade {
            trade_id: TradeId::from_uuid(parse_uuid(&row.trade_id)?),
            buyer_id: UserId::from_uuid(parse_uuid(&row.buyer_id)?),
            seller_id: UserId::from_uuid(parse_uuid(&row.seller_id)?),
            quantity: parse_decimal(&row.quantity)?,
            unit: row.unit,
            price_per_unit: parse_decimal(&row.price_per_unit)?,
            total_amount: parse_decimal(&row.total_amount)?,
            currency: row.currency,
            status,
            escrow_amount: parse_decimal(&row.escrow_amount)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionRow {
    pub record_id: String,
    pub user_id: String,
    pub trade_id: Option<String>,
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = EscrowError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = TransactionKind::parse(&row.kind).ok_or_else(|| {
            EscrowError::storage(format!("unknown transaction kind {:?}", row.kind))
        })?;
        let status = TransactionStatus::parse(&row.status).ok_or_else(|| {
            EscrowError::storage(format!("unknown transaction status {:?}", row.status))
        })?;
        let trade_id = match row.trade_id {
            Some(raw) => Some(TradeId::from_uuid(parse_uuid(&raw)?)),
            None => None,
        };

        Ok(TransactionRecord {
            record_id: RecordId::from_uuid(parse_uuid(&row.record_id)?),
            user_id: UserId::from_uuid(parse_uuid(&row.user_id)?),
            trade_id,
            kind,
            amount: parse_decimal(&row.amount)?,
            currency: row.currency,
            status,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, EscrowError> {
    Uuid::parse_str(raw).map_err(|e| EscrowError::storage(format!("corrupt id {raw:?}: {e}")))
}

fn parse_decimal(raw: &str) -> Result<Decimal, EscrowError> {
    Decimal::from_str(raw)
        .map_err(|e| EscrowError::storage(format!("corrupt amount {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_row_conversion() {
        let user_id = UserId::new();
        let row = AccountRow {
            user_id: user_id.to_string(),
            wallet_balance: "1250.75".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let account = Account::try_from(row).unwrap();
        assert_eq!(account.user_id, user_id);
        assert_eq!(
            account.wallet_balance,
            Decimal::from_str("1250.75").unwrap()
        );
    }

    #[test]
    fn test_corrupt_balance_rejected() {
        let row = AccountRow {
            user_id: UserId::new().to_string(),
            wallet_balance: "not-a-number".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let err = Account::try_from(row).unwrap_err();
        assert!(matches!(err, EscrowError::Storage { .. }));
    }

    #[test]
    fn test_unknown_trade_status_rejected() {
        let row = TradeRow {
            trade_id: TradeId::new().to_string(),
            buyer_id: UserId::new().to_string(),
            seller_id: UserId::new().to_string(),
            quantity: "5".to_string(),
            unit: None,
            price_per_unit: "100".to_string(),
            total_amount: "500".to_string(),
            currency: "INR".to_string(),
            status: "approved".to_string(),
            escrow_amount: "0".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let err = Trade::try_from(row).unwrap_err();
        assert!(matches!(err, EscrowError::Storage { .. }));
    }

    #[test]
    fn test_transaction_row_without_trade() {
        let row = TransactionRow {
            record_id: RecordId::new().to_string(),
            user_id: UserId::new().to_string(),
            trade_id: None,
            kind: "deposit".to_string(),
            amount: "100".to_string(),
            currency: "INR".to_string(),
            status: "completed".to_string(),
            notes: Some("Manual deposit".to_string()),
            created_at: Utc::now(),
        };

        let record = TransactionRecord::try_from(row).unwrap();
        assert_eq!(record.trade_id, None);
        assert_eq!(record.kind, TransactionKind::Deposit);
        assert_eq!(record.status, TransactionStatus::Completed);
    }
}
