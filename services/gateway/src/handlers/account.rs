use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::time::Duration;
use types::account::Account;
use types::errors::EscrowError;
use types::ids::UserId;
use uuid::Uuid;

pub async fn open_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Account>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:account_open", user.user_id),
        10,
        Duration::from_secs(60),
    )?;

    // Opens the caller's own wallet; repeat calls return the existing one
    let account = state.engine.open_account(user.user_id).await?;
    Ok(Json(account))
}

pub async fn get_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Account>, AppError> {
    // Rate limits
    state.rate_limiter.check(
        &format!("{}:account_query", user.user_id),
        60,
        Duration::from_secs(60),
    )?;

    // Identity validation: a wallet is visible to its owner only
    let requested = UserId::from_uuid(user_id);
    if requested != user.user_id {
        return Err(EscrowError::PermissionDenied {
            reason: "cannot view another user's wallet".to_string(),
        }
        .into());
    }

    let account = state.engine.account(&requested).await?;
    Ok(Json(account))
}
