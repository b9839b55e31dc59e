//! Rate limiting
//!
//! Approximate sliding window keyed by client identifier. State lives in the
//! process only; separate instances each keep their own table.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Rate limit config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Trailing window length
    pub window_ms: u64,
    /// Requests admitted per key within the window
    pub max_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 5,
        }
    }
}

/// Rate limit result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed { remaining: usize },
    Limited { retry_after: Duration },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Admission control seam, so the in-process table can be swapped for a
/// shared store.
pub trait RateLimiter: Send + Sync {
    /// Check and, when admitted, record a request for `key`
    fn check(&self, key: &str) -> RateLimitResult;
}

/// Per-key request timestamps within a trailing window
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_millis(config.window_ms),
            max_requests: config.max_requests,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Check `key` as of `now`.
    ///
    /// Every key is pruned first and keys left without timestamps are
    /// dropped. A rejected request is not recorded.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let mut requests = self.requests.lock();

        requests.retain(|_, timestamps| {
            timestamps.retain(|&t| now.saturating_duration_since(t) < self.window);
            !timestamps.is_empty()
        });

        let active = requests.get(key).map(Vec::len).unwrap_or(0);
        if active >= self.max_requests {
            let retry_after = requests
                .get(key)
                .and_then(|timestamps| timestamps.first())
                .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
                .unwrap_or(self.window);
            return RateLimitResult::Limited { retry_after };
        }

        requests.entry(key.to_string()).or_default().push(now);
        RateLimitResult::Allowed {
            remaining: self.max_requests - active - 1,
        }
    }

    /// Number of keys currently holding timestamps
    pub fn tracked_keys(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(&RateLimitConfig::default())
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn check(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_sixth_request_in_window_is_limited() {
        let limiter = SlidingWindowLimiter::default();
        let start = Instant::now();

        for i in 0..5 {
            assert!(limiter.check_at("1.2.3.4", start + ms(i * 1000)).is_allowed());
        }
        assert_eq!(
            limiter.check_at("1.2.3.4", start + ms(10_000)),
            RateLimitResult::Limited { retry_after: ms(50_000) }
        );
    }

    #[test]
    fn test_window_elapsed_admits_again() {
        let limiter = SlidingWindowLimiter::default();
        let start = Instant::now();

        for _ in 0..5 {
            limiter.check_at("1.2.3.4", start);
        }
        assert!(!limiter.check_at("1.2.3.4", start + ms(59_999)).is_allowed());
        assert!(limiter.check_at("1.2.3.4", start + ms(60_000)).is_allowed());
    }

    #[test]
    fn test_rejections_are_not_recorded() {
        let limiter = SlidingWindowLimiter::new(&RateLimitConfig { window_ms: 1000, max_requests: 1 });
        let start = Instant::now();

        assert!(limiter.check_at("k", start).is_allowed());
        for i in 1..10 {
            assert!(!limiter.check_at("k", start + ms(i * 50)).is_allowed());
        }
        assert!(limiter.check_at("k", start + ms(1000)).is_allowed());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(&RateLimitConfig { window_ms: 1000, max_requests: 1 });
        let now = Instant::now();

        assert!(limiter.check_at("a", now).is_allowed());
        assert!(limiter.check_at("b", now).is_allowed());
        assert!(!limiter.check_at("a", now).is_allowed());
    }

    #[test]
    fn test_every_key_is_pruned_on_check() {
        let limiter = SlidingWindowLimiter::new(&RateLimitConfig { window_ms: 1000, max_requests: 5 });
        let start = Instant::now();

        limiter.check_at("a", start);
        limiter.check_at("b", start);
        assert_eq!(limiter.tracked_keys(), 2);

        limiter.check_at("c", start + ms(1500));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_remaining_counts_down() {
        let limiter = SlidingWindowLimiter::default();
        let now = Instant::now();
        assert_eq!(limiter.check_at("k", now), RateLimitResult::Allowed { remaining: 4 });
        assert_eq!(limiter.check_at("k", now), RateLimitResult::Allowed { remaining: 3 });
    }

    #[test]
    fn test_zero_budget_always_limits() {
        let limiter = SlidingWindowLimiter::new(&RateLimitConfig { window_ms: 1000, max_requests: 0 });
        assert_eq!(
            limiter.check_at("k", Instant::now()),
            RateLimitResult::Limited { retry_after: ms(1000) }
        );
    }
}
