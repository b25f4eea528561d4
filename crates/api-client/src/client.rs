//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{AlertApi, OverpassApi};
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use safealert_core::rate_limit::RateLimiter;
use safealert_core::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

const CLIENT_USER_AGENT: &str = concat!("safealert-api-client/", env!("CARGO_PKG_VERSION"));

/// Longest we will sleep for a rate-limit token before giving up
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(2);

/// Outgoing request payload
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Serialized JSON document
    Json(serde_json::Value),
    /// Plain text (Overpass QL)
    Text(String),
}

impl RequestBody {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Json(value) => request.json(value),
            Self::Text(text) => request
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(text.clone()),
        }
    }
}

/// SafeAlert API client with built-in resilience patterns
///
/// This client wraps `reqwest` and adds:
/// - Automatic retry with exponential backoff
/// - Circuit breaker to prevent cascading failures
/// - Per-host rate limiting with a short bounded wait
/// - Request correlation IDs for tracing
#[derive(Clone)]
pub struct SafealertClient {
    inner: Client,
    config: Arc<ClientConfig>,
    circuit_breaker: Arc<CircuitBreaker>,
    rate_limiter: Arc<RateLimiter>,
}

impl SafealertClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        let circuit_breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()));
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));

        Ok(Self {
            inner,
            config: Arc::new(config),
            circuit_breaker,
            rate_limiter,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get circuit breaker state
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    /// Reset the circuit breaker
    pub fn reset_circuit(&self) {
        self.circuit_breaker.reset();
    }

    /// Reset rate limits for a specific host
    pub fn reset_rate_limit(&self, host: &str) {
        self.rate_limiter.reset(host);
    }

    /// Access the geodata query endpoint
    #[must_use]
    pub fn overpass(&self) -> OverpassApi {
        OverpassApi::new(self.clone())
    }

    /// Access the alert endpoint
    #[must_use]
    pub fn alerts(&self) -> AlertApi {
        AlertApi::new(self.clone())
    }

    /// POST a plain-text body and return the response body as text
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn post_text(&self, url: &str, body: String) -> ApiResult<String> {
        self.request(Method::POST, url, Some(RequestBody::Text(body))).await
    }

    /// POST a JSON body and deserialize the JSON response
    #[instrument(skip(self, body))]
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        let text = self.request(Method::POST, url, Some(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Execute a request with full resilience patterns
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<RequestBody>,
    ) -> ApiResult<String> {
        let request_id = Uuid::new_v4().to_string();
        let rate_limit_key = extract_rate_limit_key(url);

        if !self.circuit_breaker.can_execute() {
            warn!(
                request_id = %request_id,
                url = %url,
                "Circuit breaker is open, rejecting request"
            );
            return Err(ApiError::CircuitOpen);
        }

        self.acquire_rate_limit(&request_id, &rate_limit_key).await?;

        self.execute_with_retry(&request_id, method, url, body.as_ref())
            .await
    }

    /// Take a token for `key`, sleeping briefly if one is about to free up
    async fn acquire_rate_limit(&self, request_id: &str, key: &str) -> ApiResult<()> {
        if self.rate_limiter.try_acquire(key) {
            return Ok(());
        }

        let wait = self.rate_limiter.time_until_available(key);
        if wait > MAX_RATE_LIMIT_WAIT {
            warn!(
                request_id = %request_id,
                host = %key,
                wait_ms = wait.as_millis() as u64,
                "Rate limited"
            );
            return Err(ApiError::RateLimited);
        }

        debug!(
            request_id = %request_id,
            host = %key,
            wait_ms = wait.as_millis() as u64,
            "Waiting for rate limit token"
        );
        tokio::time::sleep(wait).await;

        if self.rate_limiter.try_acquire(key) {
            Ok(())
        } else {
            Err(ApiError::RateLimited)
        }
    }

    /// Execute request with retry logic
    async fn execute_with_retry(
        &self,
        request_id: &str,
        method: Method,
        url: &str,
        body: Option<&RequestBody>,
    ) -> ApiResult<String> {
        let retry_config = &self.config.retry;
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..retry_config.max_attempts {
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self
                .execute_single_request(request_id, method.clone(), url, body)
                .await;
            let elapsed = start.elapsed();

            match result {
                Ok(value) => {
                    self.circuit_breaker.record_success();
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    self.circuit_breaker.record_failure();

                    if e.is_retryable() && attempt + 1 < retry_config.max_attempts {
                        debug!(
                            request_id = %request_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Request failed, will retry"
                        );
                        last_error = Some(e);
                    } else {
                        debug!(
                            request_id = %request_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Request failed, not retrying"
                        );
                        return Err(e);
                    }
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: retry_config.max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Execute a single request without retry
    async fn execute_single_request(
        &self,
        request_id: &str,
        method: Method,
        url: &str,
        body: Option<&RequestBody>,
    ) -> ApiResult<String> {
        let mut request = self
            .inner
            .request(method, url)
            .header(X_REQUEST_ID, request_id);

        if let Some(body) = body {
            request = body.apply(request);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Turn a response into its body text, mapping non-2xx to `ApiResponse`
    async fn handle_response(response: Response) -> ApiResult<String> {
        let status = response.status();

        if status.is_success() {
            response.text().await.map_err(ApiError::Request)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::api_response(status.as_u16(), message))
        }
    }
}

/// Rate-limit bucket key for a URL: its `host[:port]`
fn extract_rate_limit_key(url: &str) -> String {
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split(['/', '?']).next())
        .filter(|host| !host.is_empty())
        .unwrap_or("default")
        .to_string()
}
