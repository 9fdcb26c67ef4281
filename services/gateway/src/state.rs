use crate::rate_limit::RateLimiter;
use escrow_engine::EscrowEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: EscrowEngine,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(engine: EscrowEngine) -> Self {
        Self {
            engine,
            rate_limiter: Arc::new(RateLimiter::new()),
        }
    }
}
