//! Token-bucket rate limiting per endpoint host
//!
//! Public geodata mirrors throttle aggressive clients, so every outbound
//! request acquires a token for its host first. Callers that can afford a short
//! wait use [`RateLimiter::time_until_available`] and sleep instead of failing.
//!
//! # Example
//!
//! ```rust
//! use safealert_core::rate_limit::{RateLimitConfig, RateLimiter};
//!
//! let limiter = RateLimiter::new(RateLimitConfig::per_second(2));
//! assert!(limiter.try_acquire("overpass-api.de"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests replenished per window
    pub max_requests: u32,
    /// Replenishment window
    pub window: Duration,
    /// Extra requests allowed in a short burst
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(60)
    }
}

impl RateLimitConfig {
    /// Per-second rate limit with a burst of half the rate
    #[must_use]
    pub fn per_second(max: u32) -> Self {
        Self {
            max_requests: max,
            window: Duration::from_secs(1),
            burst: max / 2,
        }
    }

    /// Per-minute rate limit with a burst of a quarter of the rate
    #[must_use]
    pub fn per_minute(max: u32) -> Self {
        Self {
            max_requests: max,
            window: Duration::from_secs(60),
            burst: max / 4,
        }
    }

    /// Bucket capacity (steady rate plus burst)
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.max_requests.saturating_add(self.burst)
    }

    fn refill_rate(&self) -> f64 {
        let window = self.window.as_secs_f64();
        if window > 0.0 {
            f64::from(self.max_requests) / window
        } else {
            f64::INFINITY
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn full(config: &RateLimitConfig) -> Self {
        Self {
            tokens: f64::from(config.capacity()),
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self, config: &RateLimitConfig) {
        let now = Instant::now();
        let gained = now.duration_since(self.last_update).as_secs_f64() * config.refill_rate();
        self.tokens = (self.tokens + gained).min(f64::from(config.capacity()));
        self.last_update = now;
    }
}

/// Rate limiter with one bucket per key
#[derive(Debug)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn with_bucket<R>(&self, key: &str, f: impl FnOnce(&mut TokenBucket, &RateLimitConfig) -> R) -> R {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::full(&self.config));
        bucket.refill(&self.config);
        f(bucket, &self.config)
    }

    /// Try to take one token for `key`
    #[must_use]
    pub fn try_acquire(&self, key: &str) -> bool {
        self.with_bucket(key, |bucket, _| {
            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                true
            } else {
                false
            }
        })
    }

    /// Time until one token is available for `key`
    #[must_use]
    pub fn time_until_available(&self, key: &str) -> Duration {
        self.with_bucket(key, |bucket, config| {
            if bucket.tokens >= 1.0 {
                return Duration::ZERO;
            }
            let rate = config.refill_rate();
            if rate > 0.0 {
                Duration::try_from_secs_f64((1.0 - bucket.tokens) / rate).unwrap_or(Duration::MAX)
            } else {
                Duration::MAX
            }
        })
    }

    /// Current bucket status for `key`
    #[must_use]
    pub fn status(&self, key: &str) -> RateLimitStatus {
        self.with_bucket(key, |bucket, config| RateLimitStatus {
            available: bucket.tokens.floor() as u32,
            max: config.capacity(),
        })
    }

    /// Forget the bucket for `key`
    pub fn reset(&self, key: &str) {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        buckets.remove(key);
    }
}

/// Rate limit status
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    /// Tokens currently available
    pub available: u32,
    /// Bucket capacity
    pub max: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict(max_requests: u32) -> RateLimitConfig {
        RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
            burst: 0,
        }
    }

    #[test]
    fn test_rate_limiter_basic() {
        let limiter = RateLimiter::new(strict(3));

        assert!(limiter.try_acquire("overpass"));
        assert!(limiter.try_acquire("overpass"));
        assert!(limiter.try_acquire("overpass"));
        assert!(!limiter.try_acquire("overpass"));
    }

    #[test]
    fn test_rate_limiter_with_burst() {
        let config = RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
            burst: 2,
        };
        let limiter = RateLimiter::new(config);

        for _ in 0..4 {
            assert!(limiter.try_acquire("overpass"));
        }
        assert!(!limiter.try_acquire("overpass"));
    }

    #[test]
    fn test_rate_limiter_different_keys() {
        let limiter = RateLimiter::new(strict(1));

        assert!(limiter.try_acquire("overpass-api.de"));
        assert!(!limiter.try_acquire("overpass-api.de"));
        assert!(limiter.try_acquire("alerts.example.org"));
    }

    #[test]
    fn test_rate_limiter_reset() {
        let limiter = RateLimiter::new(strict(1));

        assert!(limiter.try_acquire("overpass"));
        assert!(!limiter.try_acquire("overpass"));

        limiter.reset("overpass");
        assert!(limiter.try_acquire("overpass"));
    }

    #[test]
    fn test_time_until_available() {
        let limiter = RateLimiter::new(strict(1));
        assert_eq!(limiter.time_until_available("overpass"), Duration::ZERO);

        assert!(limiter.try_acquire("overpass"));
        let wait = limiter.time_until_available("overpass");
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(60));
    }

    #[test]
    fn test_status() {
        let config = RateLimitConfig {
            max_requests: 10,
            window: Duration::from_secs(60),
            burst: 5,
        };
        let limiter = RateLimiter::new(config);

        let status = limiter.status("overpass");
        assert_eq!(status.max, 15);
        assert_eq!(status.available, 15);
    }
}
