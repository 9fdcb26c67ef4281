use crate::error::AppError;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding-window rate limiter keyed by caller-chosen strings,
/// e.g. "user_id:endpoint".
pub struct RateLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Records one request under `key`, allowing at most `limit` requests
    /// per `window`. Timestamps older than the window are dropped before
    /// the limit is checked.
    pub fn check(&self, key: &str, limit: usize, window: Duration) -> Result<(), AppError> {
        let now = Instant::now();
        let mut hits = self.windows.entry(key.to_string()).or_default();

        while let Some(front) = hits.front() {
            if now.duration_since(*front) >= window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= limit {
            return Err(AppError::RateLimitExceeded(format!("Rate limit for {}", key)));
        }

        hits.push_back(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("u1:wallet", 5, Duration::from_secs(60)).is_ok());
        }
        assert!(limiter.check("u1:wallet", 5, Duration::from_secs(60)).is_err());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("u1:trade", 1, Duration::from_secs(60)).is_ok());
        assert!(limiter.check("u1:trade", 1, Duration::from_secs(60)).is_err());
        assert!(limiter.check("u2:trade", 1, Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn test_window_expiry_frees_slots() {
        let limiter = RateLimiter::new();
        let window = Duration::from_millis(50);
        assert!(limiter.check("u1:status", 1, window).is_ok());
        assert!(limiter.check("u1:status", 1, window).is_err());
        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.check("u1:status", 1, window).is_ok());
    }
}
