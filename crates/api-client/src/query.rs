//! Overpass QL query builder

use crate::error::{ApiError, ApiResult};
use safealert_core::config::is_valid_category;
use safealert_geo::Coordinate;
use std::fmt::Write as _;

/// Server-side timeout the interpreter is asked to honour, in seconds
pub const DEFAULT_SERVER_TIMEOUT_SECS: u32 = 25;

/// Element kinds requested for every category
const ELEMENT_KINDS: [&str; 3] = ["node", "way", "relation"];

/// A radius-bounded `amenity=<category>` query around a point.
///
/// ```
/// use safealert_api_client::OverpassQuery;
/// use safealert_geo::Coordinate;
///
/// let ql = OverpassQuery::new(Coordinate::new(12.9716, 77.5946), 2000)
///     .with_categories(["hospital"])
///     .render();
///
/// assert!(ql.starts_with("[out:json][timeout:25];("));
/// assert!(ql.contains("way(around:2000,12.9716,77.5946)[amenity=hospital];"));
/// assert!(ql.ends_with(");out center;"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassQuery {
    center: Coordinate,
    radius_m: u32,
    categories: Vec<String>,
    timeout_secs: u32,
}

impl OverpassQuery {
    /// Query around `center` with no categories yet
    #[must_use]
    pub fn new(center: Coordinate, radius_m: u32) -> Self {
        Self {
            center,
            radius_m,
            categories: Vec::new(),
            timeout_secs: DEFAULT_SERVER_TIMEOUT_SECS,
        }
    }

    /// Replace the amenity categories
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the server-side timeout
    #[must_use]
    pub fn with_timeout(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Reject inputs that would produce a meaningless or malformed query
    pub fn validate(&self) -> ApiResult<()> {
        if !self.center.is_valid() {
            return Err(ApiError::invalid_input(format!(
                "center {} is not a valid coordinate",
                self.center
            )));
        }
        if self.radius_m == 0 {
            return Err(ApiError::invalid_input("radius must be a positive number of meters"));
        }
        if let Some(bad) = self.categories.iter().find(|c| !is_valid_category(c)) {
            return Err(ApiError::invalid_input(format!(
                "category {bad:?} may only contain letters, digits, '_' and '-'"
            )));
        }
        Ok(())
    }

    /// Render the Overpass QL text
    #[must_use]
    pub fn render(&self) -> String {
        let Coordinate { latitude, longitude } = self.center;
        let mut ql = format!("[out:json][timeout:{}];(", self.timeout_secs);

        for category in &self.categories {
            for kind in ELEMENT_KINDS {
                let _ = write!(
                    ql,
                    "{kind}(around:{},{latitude},{longitude})[amenity={category}];",
                    self.radius_m
                );
            }
        }

        ql.push_str(");out center;");
        ql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bengaluru() -> Coordinate {
        Coordinate::new(12.9716, 77.5946)
    }

    #[test]
    fn test_render_matches_interpreter_format() {
        let ql = OverpassQuery::new(bengaluru(), 2000)
            .with_categories(["hospital", "pharmacy"])
            .render();

        assert_eq!(
            ql,
            "[out:json][timeout:25];(\
             node(around:2000,12.9716,77.5946)[amenity=hospital];\
             way(around:2000,12.9716,77.5946)[amenity=hospital];\
             relation(around:2000,12.9716,77.5946)[amenity=hospital];\
             node(around:2000,12.9716,77.5946)[amenity=pharmacy];\
             way(around:2000,12.9716,77.5946)[amenity=pharmacy];\
             relation(around:2000,12.9716,77.5946)[amenity=pharmacy];\
             );out center;"
        );
    }

    #[test]
    fn test_custom_timeout() {
        let ql = OverpassQuery::new(bengaluru(), 500)
            .with_categories(["clinic"])
            .with_timeout(10)
            .render();
        assert!(ql.starts_with("[out:json][timeout:10];"));
    }

    #[test]
    fn test_validate() {
        assert!(OverpassQuery::new(bengaluru(), 3000)
            .with_categories(["hospital"])
            .validate()
            .is_ok());

        let zero = OverpassQuery::new(bengaluru(), 0);
        assert!(matches!(zero.validate(), Err(ApiError::InvalidInput(_))));

        let off_globe = OverpassQuery::new(Coordinate::new(120.0, 0.0), 100);
        assert!(matches!(off_globe.validate(), Err(ApiError::InvalidInput(_))));

        let injected = OverpassQuery::new(bengaluru(), 100).with_categories(["hospital];out;"]);
        assert!(matches!(injected.validate(), Err(ApiError::InvalidInput(_))));
    }
}
