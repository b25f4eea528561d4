//! Resilient HTTP client for SafeAlert
//!
//! Talks to two services: an Overpass API interpreter for nearby emergency
//! facilities, and an alert endpoint that receives panic payloads.
//!
//! # Features
//!
//! - **Environment-based configuration**: endpoint URLs and timeouts from env vars
//! - **Retry with exponential backoff**: automatic retry for transient failures
//! - **Circuit breaker**: stop hammering a geodata mirror that keeps failing
//! - **Rate limiting**: short waits instead of tripping public mirror throttles
//! - **Request correlation**: every request carries an `X-Request-ID`
//! - **Last request wins**: [`RequestSequencer`] discards stale completions
//!
//! # Example
//!
//! ```rust,no_run
//! use safealert_api_client::{ClientConfig, SafealertClient};
//! use safealert_geo::Coordinate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SafealertClient::new()?;
//!     let user = Coordinate::new(12.9716, 77.5946);
//!
//!     let places = client
//!         .overpass()
//!         .query(user, 3000, &["hospital", "clinic", "pharmacy"])
//!         .await;
//!     println!("Found {} places", places.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod query;
pub mod sequence;

pub use client::SafealertClient;
pub use config::{ClientConfig, Environment};
pub use endpoints::{
    AlertAck, AlertApi, AlertPayload, AlertUser, OverpassApi, QueryOutcome, MANUAL_NOTE, PANIC_NOTE,
};
pub use error::{ApiError, ApiResult};
pub use query::OverpassQuery;
pub use sequence::{RequestSequencer, RequestTicket};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::SafealertClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{AlertApi, AlertPayload, OverpassApi, QueryOutcome};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::sequence::{RequestSequencer, RequestTicket};
}
