use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{StatementResponse, WalletMovementRequest, WalletResponse};
use crate::state::AppState;
use axum::{extract::State, Json};
use std::time::Duration;

/// Newest transactions returned by the statement endpoint.
const STATEMENT_LIMIT: u32 = 20;

pub async fn deposit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<WalletMovementRequest>,
) -> Result<Json<WalletResponse>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:wallet_move", user.user_id),
        30,
        Duration::from_secs(60),
    )?;

    let record = state
        .engine
        .deposit_to_wallet(user.user_id, req.amount, req.notes)
        .await?;
    let account = state.engine.account(&user.user_id).await?;
    Ok(Json(WalletResponse { account, record }))
}

pub async fn withdraw(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<WalletMovementRequest>,
) -> Result<Json<WalletResponse>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:wallet_move", user.user_id),
        30,
        Duration::from_secs(60),
    )?;

    let record = state
        .engine
        .withdraw_from_wallet(user.user_id, req.amount, req.notes)
        .await?;
    let account = state.engine.account(&user.user_id).await?;
    Ok(Json(WalletResponse { account, record }))
}

pub async fn statement(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<StatementResponse>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:statement_query", user.user_id),
        60,
        Duration::from_secs(60),
    )?;

    let account = state.engine.account(&user.user_id).await?;
    let transactions = state
        .engine
        .account_statement(&user.user_id, STATEMENT_LIMIT)
        .await?;
    Ok(Json(StatementResponse {
        balance: account.wallet_balance,
        transactions,
    }))
}
