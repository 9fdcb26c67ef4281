use crate::handlers::{account, trade, wallet};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/accounts", post(account::open_account))
        .route("/accounts/:id", get(account::get_account))
        .route("/wallet/deposit", post(wallet::deposit))
        .route("/wallet/withdraw", post(wallet::withdraw))
        .route("/wallet/statement", get(wallet::statement))
        .route("/trades", post(trade::create_trade).get(trade::list_trades))
        .route("/trades/:id", get(trade::get_trade))
        .route("/trades/:id/escrow", post(trade::escrow_action))
        .route("/trades/:id/status", post(trade::update_status))
        .route("/trades/:id/ledger", get(trade::trade_ledger));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
