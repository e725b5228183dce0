//! In-memory keyed rate limiter using the governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use pinboard_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

type KeyedRateLimiter = GovernorRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window, per key.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

/// Per-key in-memory rate limiter using the GCRA algorithm.
///
/// Limits are per-process, not distributed across instances; keys are
/// whatever the caller chooses (typically client address).
pub struct InMemoryRateLimiter {
    limiter: KeyedRateLimiter,
    config: RateLimitConfig,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let max = NonZeroU32::new(config.max_requests.max(1)).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(config.window / max.get())
            .unwrap_or_else(|| Quota::per_minute(max))
            .allow_burst(max);

        Self {
            limiter: GovernorRateLimiter::keyed(quota),
            config,
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Ok(RateLimitResult {
                allowed: true,
                remaining: self.config.max_requests, // approximate
                reset_after: self.config.window,
            }),
            Err(not_until) => Ok(RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after: not_until.wait_time_from(DefaultClock::default().now()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_is_allowed_then_limited() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        });

        assert!(limiter.check("1.2.3.4").await.unwrap().allowed);
        assert!(limiter.check("1.2.3.4").await.unwrap().allowed);
        let third = limiter.check("1.2.3.4").await.unwrap();
        assert!(!third.allowed);
        assert!(third.reset_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn keys_are_limited_independently() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        });

        assert!(limiter.check("a").await.unwrap().allowed);
        assert!(!limiter.check("a").await.unwrap().allowed);
        assert!(limiter.check("b").await.unwrap().allowed);
    }
}
