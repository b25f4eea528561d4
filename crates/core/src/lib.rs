//! Core utilities for SafeAlert
//!
//! Shared functionality used by the geodata client and the CLI:
//!
//! - **Error handling**: coded errors with context and recovery suggestions
//! - **Configuration**: TOML-based search/alert/logging settings with validation
//! - **Retry**: backoff policy and circuit breaker for flaky geodata mirrors
//! - **Rate limiting**: token buckets keyed by endpoint host
//!
//! # Example
//!
//! ```rust,no_run
//! use safealert_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("searching within {} m", config.schema.search.radius_m);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod retry;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, SearchConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::rate_limit::{RateLimitConfig, RateLimiter};
    pub use crate::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig};
}
