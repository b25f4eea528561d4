//! Configuration for the SafeAlert API client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use safealert_core::rate_limit::RateLimitConfig;
use safealert_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Public Overpass API interpreter
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Local alert receiver
pub const DEFAULT_ALERT_URL: &str = "http://localhost:3000/api/send-alert";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development against a nearby mirror and alert receiver
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse from the `SAFEALERT_ENV` environment variable
    pub fn from_env() -> Self {
        Self::parse(&env::var("SAFEALERT_ENV").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Overpass API interpreter endpoint
    pub overpass_url: String,
    /// Endpoint that receives panic alerts
    pub alert_url: String,
    /// Client-side request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Rate limit configuration
    pub rate_limit: RateLimitConfig,
    /// Current environment
    pub environment: Environment,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `SAFEALERT_OVERPASS_URL`: Overpass interpreter endpoint
    /// - `SAFEALERT_ALERT_URL`: alert endpoint
    /// - `SAFEALERT_ENV`: environment (development/staging/production)
    /// - `SAFEALERT_TIMEOUT_SECS`: request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        let mut config = match Environment::from_env() {
            Environment::Development => Self::development(),
            Environment::Staging => Self::staging(),
            Environment::Production => Self::production(),
        };

        if let Ok(url) = env::var("SAFEALERT_OVERPASS_URL") {
            config.overpass_url = url;
        }
        if let Ok(url) = env::var("SAFEALERT_ALERT_URL") {
            config.alert_url = url;
        }
        if let Ok(secs) = env::var("SAFEALERT_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ApiError::config(format!("SAFEALERT_TIMEOUT_SECS is not a number: {secs}")))?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Development configuration: quick retries, lenient rate limit
    #[must_use]
    pub fn development() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            alert_url: DEFAULT_ALERT_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::quick(),
            rate_limit: RateLimitConfig::per_minute(600),
            environment: Environment::Development,
        }
    }

    /// Staging configuration
    #[must_use]
    pub fn staging() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            alert_url: DEFAULT_ALERT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::per_minute(120),
            environment: Environment::Staging,
        }
    }

    /// Production configuration: patient retries, polite rate limit
    #[must_use]
    pub fn production() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            alert_url: DEFAULT_ALERT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::patient(),
            rate_limit: RateLimitConfig::per_minute(60),
            environment: Environment::Production,
        }
    }

    /// Builder-style method to set the Overpass URL
    #[must_use]
    pub fn with_overpass_url(mut self, url: impl Into<String>) -> Self {
        self.overpass_url = url.into();
        self
    }

    /// Builder-style method to set the alert URL
    #[must_use]
    pub fn with_alert_url(mut self, url: impl Into<String>) -> Self {
        self.alert_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set rate limit config
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        check_url("overpass_url", &self.overpass_url)?;
        check_url("alert_url", &self.alert_url)?;

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.retry.max_attempts == 0 {
            return Err(ApiError::config("retry.max_attempts must be at least 1"));
        }

        Ok(())
    }
}

fn check_url(field: &str, url: &str) -> ApiResult<()> {
    if url.is_empty() {
        return Err(ApiError::config(format!("{field} cannot be empty")));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::InvalidUrl(format!(
            "{field} must start with http:// or https://, got {url}"
        )));
    }
    Ok(())
}
