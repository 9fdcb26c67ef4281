mod auth;
mod error;
mod handlers;
mod models;
mod rate_limit;
mod router;
mod state;

use escrow_engine::EscrowEngine;
use ledger::LedgerStore;
use router::create_router;
use state::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting escrow gateway service");

    let database_url = std::env::var("ESCROW_DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:escrow.db?mode=rwc".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(8080);

    // Open the ledger and wire up the engine
    let pool = ledger::init_ledger(&database_url).await?;
    let engine = EscrowEngine::new(LedgerStore::new(pool));
    let state = AppState::new(engine);

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
