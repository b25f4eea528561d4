//! Geodata query endpoint

use crate::client::SafealertClient;
use crate::error::{ApiError, ApiResult};
use crate::query::OverpassQuery;
use safealert_geo::{parse_response, Coordinate, Place};
use safealert_telemetry::{metrics, names, Timer};
use tracing::{debug, info, warn};

/// What a geodata query produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// At least one usable place
    Found(Vec<Place>),
    /// The service answered, but nothing usable matched
    Empty,
}

impl QueryOutcome {
    fn from_places(places: Vec<Place>) -> Self {
        if places.is_empty() {
            Self::Empty
        } else {
            Self::Found(places)
        }
    }

    /// Places found, empty for [`QueryOutcome::Empty`]
    #[must_use]
    pub fn into_places(self) -> Vec<Place> {
        match self {
            Self::Found(places) => places,
            Self::Empty => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Overpass API interface
#[derive(Clone)]
pub struct OverpassApi {
    client: SafealertClient,
}

impl OverpassApi {
    pub(crate) fn new(client: SafealertClient) -> Self {
        Self { client }
    }

    /// Best-effort search: any failure is logged and yields no places.
    ///
    /// Use [`OverpassApi::try_query`] when the caller needs to tell an
    /// outage apart from an area with no facilities.
    pub async fn query<S: AsRef<str>>(
        &self,
        center: Coordinate,
        radius_m: u32,
        categories: &[S],
    ) -> Vec<Place> {
        match self.try_query(center, radius_m, categories).await {
            Ok(outcome) => outcome.into_places(),
            Err(e) => {
                warn!(error = %e, center = %center, radius_m, "Geodata query failed, returning no places");
                Vec::new()
            }
        }
    }

    /// Search for `amenity=<category>` features within `radius_m` of `center`
    pub async fn try_query<S: AsRef<str>>(
        &self,
        center: Coordinate,
        radius_m: u32,
        categories: &[S],
    ) -> ApiResult<QueryOutcome> {
        let query = OverpassQuery::new(center, radius_m)
            .with_categories(categories.iter().map(|c| c.as_ref().to_string()));
        self.try_run(&query).await
    }

    /// Run a prepared query
    pub async fn try_run(&self, query: &OverpassQuery) -> ApiResult<QueryOutcome> {
        query.validate()?;

        if query.categories().is_empty() {
            debug!("No categories requested, skipping geodata query");
            return Ok(QueryOutcome::Empty);
        }

        metrics().increment(names::GEODATA_QUERIES);
        let timer = Timer::start(names::GEODATA_LATENCY_MS);
        let result = self.fetch(query).await;
        let elapsed = timer.stop();

        let places = result.inspect_err(|_| metrics().increment(names::GEODATA_FAILURES))?;
        metrics().gauge(names::PLACES_RETURNED, places.len() as u64);

        info!(
            center = %query.center(),
            radius_m = query.radius_m(),
            places = places.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Geodata query completed"
        );

        Ok(QueryOutcome::from_places(places))
    }

    async fn fetch(&self, query: &OverpassQuery) -> ApiResult<Vec<Place>> {
        let url = &self.client.config().overpass_url;
        let body = self.client.post_text(url, query.render()).await?;
        parse_response(&body).map_err(ApiError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use safealert_core::retry::RetryConfig;
    use std::time::Duration;

    fn unreachable_client() -> SafealertClient {
        // Port 1 on loopback refuses connections immediately
        let config = ClientConfig::development()
            .with_overpass_url("http://127.0.0.1:1/api/interpreter")
            .with_timeout(Duration::from_secs(2))
            .with_retry(RetryConfig::no_retry());
        SafealertClient::with_config(config).unwrap()
    }

    fn bengaluru() -> Coordinate {
        Coordinate::new(12.9716, 77.5946)
    }

    #[test]
    fn test_outcome_from_places() {
        assert!(QueryOutcome::from_places(Vec::new()).is_empty());

        let place = Place::new(1, "clinic", "Clinic", bengaluru());
        let outcome = QueryOutcome::from_places(vec![place.clone()]);
        assert_eq!(outcome.into_places(), vec![place]);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_swallowed_by_query() {
        let api = unreachable_client().overpass();
        let places = api.query(bengaluru(), 2000, &["hospital"]).await;
        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_reported_by_try_query() {
        let api = unreachable_client().overpass();
        let result = api.try_query(bengaluru(), 2000, &["hospital"]).await;
        assert!(matches!(result, Err(ApiError::Request(_))));
    }

    #[tokio::test]
    async fn test_empty_categories_skip_network() {
        let api = unreachable_client().overpass();
        let categories: [&str; 0] = [];
        let outcome = api.try_query(bengaluru(), 2000, &categories).await.unwrap();
        assert_eq!(outcome, QueryOutcome::Empty);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_network() {
        let api = unreachable_client().overpass();

        let zero = api.try_query(bengaluru(), 0, &["hospital"]).await;
        assert!(matches!(zero, Err(ApiError::InvalidInput(_))));

        let bad_center = api
            .try_query(Coordinate::new(f64::NAN, 0.0), 100, &["hospital"])
            .await;
        assert!(matches!(bad_center, Err(ApiError::InvalidInput(_))));

        assert!(api.query(bengaluru(), 0, &["hospital"]).await.is_empty());
    }
}
