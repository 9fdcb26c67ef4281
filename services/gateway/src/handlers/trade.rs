use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{
    CreateTradeRequest, EscrowAction, EscrowActionRequest, EscrowActionResponse,
    UpdateStatusRequest,
};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use escrow_engine::NewTrade;
use std::time::Duration;
use types::errors::EscrowError;
use types::ids::TradeId;
use types::trade::Trade;
use types::transaction::TransactionRecord;
use uuid::Uuid;

pub async fn create_trade(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreateTradeRequest>,
) -> Result<Json<Trade>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:trade_create", user.user_id),
        10,
        Duration::from_secs(60),
    )?;

    // The caller is always the buyer side of the new trade
    let trade = state
        .engine
        .create_trade(
            user.user_id,
            NewTrade {
                seller_id: req.seller_id,
                quantity: req.quantity,
                unit: req.unit,
                price_per_unit: req.price_per_unit,
                currency: req.currency,
                notes: req.notes,
            },
        )
        .await?;
    Ok(Json(trade))
}

pub async fn list_trades(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Trade>>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:trade_query", user.user_id),
        60,
        Duration::from_secs(60),
    )?;

    let trades = state.engine.trades_for(&user.user_id).await?;
    Ok(Json(trades))
}

pub async fn get_trade(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(trade_id): Path<Uuid>,
) -> Result<Json<Trade>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:trade_query", user.user_id),
        60,
        Duration::from_secs(60),
    )?;

    let trade_id = TradeId::from_uuid(trade_id);
    let trade = state
        .engine
        .trade_for_participant(&user.user_id, &trade_id)
        .await?;
    Ok(Json(trade))
}

pub async fn escrow_action(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(trade_id): Path<Uuid>,
    Json(req): Json<EscrowActionRequest>,
) -> Result<Json<EscrowActionResponse>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:escrow_action", user.user_id),
        20,
        Duration::from_secs(60),
    )?;
    let trade_id = TradeId::from_uuid(trade_id);

    // Dispatch to the matching escrow operation
    let record = match req.action {
        EscrowAction::Deposit => {
            let amount = req.amount.ok_or(EscrowError::InvalidAmount)?;
            state
                .engine
                .deposit_to_trade(user.user_id, trade_id, amount)
                .await?
        }
        EscrowAction::Release => state.engine.release_to_seller(user.user_id, trade_id).await?,
        EscrowAction::Refund => state.engine.refund_to_buyer(user.user_id, trade_id).await?,
    };

    // Echo the post-move trade state alongside the record
    let trade = state
        .engine
        .trade_for_participant(&user.user_id, &trade_id)
        .await?;
    Ok(Json(EscrowActionResponse {
        escrow_amount: trade.escrow_amount,
        status: trade.status,
        record,
    }))
}

pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(trade_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Trade>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:status_update", user.user_id),
        30,
        Duration::from_secs(60),
    )?;

    let trade = state
        .engine
        .update_trade_status(user.user_id, TradeId::from_uuid(trade_id), req.status)
        .await?;
    Ok(Json(trade))
}

pub async fn trade_ledger(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(trade_id): Path<Uuid>,
) -> Result<Json<Vec<TransactionRecord>>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:ledger_query", user.user_id),
        60,
        Duration::from_secs(60),
    )?;

    let records = state
        .engine
        .trade_ledger(&user.user_id, &TradeId::from_uuid(trade_id))
        .await?;
    Ok(Json(records))
}
