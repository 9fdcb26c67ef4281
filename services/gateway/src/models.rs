use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::account::Account;
use types::ids::UserId;
use types::trade::TradeStatus;
use types::transaction::TransactionRecord;

#[derive(Debug, Clone, Deserialize)]
pub struct WalletMovementRequest {
    pub amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletResponse {
    pub account: Account,
    pub record: TransactionRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementResponse {
    pub balance: Decimal,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTradeRequest {
    pub seller_id: UserId,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub price_per_unit: Decimal,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

/// Escrow operations multiplexed through one endpoint. Deposit needs an
/// amount; release and refund always move the full held amount.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowAction {
    Deposit,
    Release,
    Refund,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EscrowActionRequest {
    pub action: EscrowAction,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EscrowActionResponse {
    pub escrow_amount: Decimal,
    pub status: TradeStatus,
    pub record: TransactionRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TradeStatus,
}
