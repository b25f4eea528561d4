//! Normalization of raw geodata features into [`Place`] records.
//!
//! Features come from an Overpass-style response: nodes carry `lat`/`lon`
//! directly, ways and relations carry a representative `center`. A feature
//! that yields no usable coordinate is dropped here and never reaches the
//! ranking code.

use crate::{Coordinate, Place, PlaceId, Result, FALLBACK_CATEGORY, UNKNOWN_NAME};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

/// A single feature as returned by the geodata service.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeature {
    /// `node`, `way` or `relation`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub id: PlaceId,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<RawCenter>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, Value>>,
}

/// Representative point of a non-point geometry.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawCenter {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl RawFeature {
    /// Own coordinate if complete, otherwise the center if complete.
    fn location(&self) -> Option<Coordinate> {
        complete(self.lat, self.lon)
            .or_else(|| self.center.and_then(|c| complete(c.lat, c.lon)))
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()?
            .get(key)?
            .as_str()
            .filter(|s| !s.trim().is_empty())
    }
}

fn complete(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinate> {
    let coord = Coordinate::new(lat?, lon?);
    coord.is_valid().then_some(coord)
}

/// Converts a raw feature into a place, or `None` if it has no location.
pub fn normalize(feature: RawFeature) -> Option<Place> {
    let Some(location) = feature.location() else {
        trace!(id = %feature.id, "dropping feature without coordinates");
        return None;
    };

    let category = feature.tag("amenity").unwrap_or(FALLBACK_CATEGORY).to_string();
    let name = feature
        .tag("name")
        .or_else(|| feature.tag("official_name"))
        .unwrap_or(UNKNOWN_NAME)
        .to_string();

    let attributes = feature
        .tags
        .map(|tags| {
            tags.into_iter()
                .map(|(key, value)| match value {
                    Value::String(s) => (key, s),
                    other => (key, other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Place {
        id: feature.id,
        category,
        name,
        location,
        attributes,
    })
}

/// Normalizes an untyped element; malformed elements yield `None`.
pub fn normalize_value(value: &Value) -> Option<Place> {
    match RawFeature::deserialize(value) {
        Ok(feature) => normalize(feature),
        Err(e) => {
            trace!(error = %e, "dropping malformed feature");
            None
        }
    }
}

/// Normalizes every feature, preserving order and dropping invalid ones.
pub fn normalize_all<I>(features: I) -> Vec<Place>
where
    I: IntoIterator<Item = RawFeature>,
{
    features.into_iter().filter_map(normalize).collect()
}

/// Top-level shape of a geodata response body.
#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    elements: Vec<Value>,
}

/// Parses a JSON response body (`{"elements": [...]}`) into places.
///
/// A body that is not JSON, or not an object, is an error. Individual
/// malformed elements are dropped.
pub fn parse_response(body: &str) -> Result<Vec<Place>> {
    let body: ResponseBody = serde_json::from_str(body)?;
    Ok(body.elements.iter().filter_map(normalize_value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(value: Value) -> RawFeature {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_node_with_coordinates() {
        let place = normalize(feature(json!({
            "type": "node",
            "id": 101,
            "lat": 12.97,
            "lon": 77.59,
            "tags": {"amenity": "hospital", "name": "City Hospital", "emergency": "yes"}
        })))
        .unwrap();

        assert_eq!(place.id, PlaceId::Numeric(101));
        assert_eq!(place.category, "hospital");
        assert_eq!(place.name, "City Hospital");
        assert_eq!(place.location, Coordinate::new(12.97, 77.59));
        assert_eq!(place.attributes.get("emergency").map(String::as_str), Some("yes"));
    }

    #[test]
    fn test_way_uses_center() {
        let place = normalize(feature(json!({
            "type": "way",
            "id": 202,
            "center": {"lat": 12.5, "lon": 77.5},
            "tags": {"amenity": "clinic"}
        })))
        .unwrap();

        assert_eq!(place.location, Coordinate::new(12.5, 77.5));
    }

    #[test]
    fn test_no_coordinate_and_no_center_is_dropped() {
        assert!(normalize(feature(json!({"type": "relation", "id": 3, "tags": {}}))).is_none());
    }

    #[test]
    fn test_half_coordinate_is_dropped() {
        assert!(normalize(feature(json!({"type": "node", "id": 4, "lat": 12.0}))).is_none());
        assert!(
            normalize(feature(json!({"type": "way", "id": 5, "center": {"lon": 77.0}}))).is_none()
        );
    }

    #[test]
    fn test_zero_coordinates_are_kept() {
        let place = normalize(feature(json!({"type": "node", "id": 6, "lat": 0.0, "lon": 0.0})));
        assert_eq!(place.unwrap().location, Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn test_out_of_range_coordinate_is_dropped() {
        assert!(normalize(feature(json!({"id": 7, "lat": 123.0, "lon": 0.0}))).is_none());
    }

    #[test]
    fn test_missing_name_defaults_to_unknown() {
        let place = normalize(feature(json!({
            "id": 8, "lat": 1.0, "lon": 1.0, "tags": {"amenity": "pharmacy"}
        })))
        .unwrap();
        assert_eq!(place.name, UNKNOWN_NAME);
    }

    #[test]
    fn test_official_name_fallback() {
        let place = normalize(feature(json!({
            "id": 9, "lat": 1.0, "lon": 1.0, "tags": {"official_name": "St. Mary's"}
        })))
        .unwrap();
        assert_eq!(place.name, "St. Mary's");
    }

    #[test]
    fn test_missing_tags_defaults() {
        let place = normalize(feature(json!({"id": 10, "lat": 1.0, "lon": 1.0}))).unwrap();
        assert_eq!(place.category, FALLBACK_CATEGORY);
        assert_eq!(place.name, UNKNOWN_NAME);
        assert!(place.attributes.is_empty());
    }

    #[test]
    fn test_normalize_value_drops_malformed() {
        assert!(normalize_value(&json!({"lat": 1.0, "lon": 1.0})).is_none());
        assert!(normalize_value(&json!("not an element")).is_none());
        assert!(normalize_value(&json!({"id": "abc", "lat": 1.0, "lon": 1.0})).is_some());
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 12.97, "lon": 77.59, "tags": {"amenity": "hospital"}},
                {"type": "way", "id": 2, "tags": {"amenity": "clinic"}},
                {"type": "way", "id": 3, "center": {"lat": 12.96, "lon": 77.58}},
                {"bogus": true}
            ]
        }"#;

        let places = parse_response(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].category, "hospital");
        assert_eq!(places[1].category, FALLBACK_CATEGORY);
    }

    #[test]
    fn test_parse_response_rejects_non_json() {
        assert!(matches!(
            parse_response("<html>rate limited</html>"),
            Err(crate::GeoError::JsonError(_))
        ));
        assert!(parse_response(r#"{"remark": "runtime error"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_all_preserves_order() {
        let features = vec![
            feature(json!({"id": 1, "lat": 1.0, "lon": 1.0})),
            feature(json!({"id": 2})),
            feature(json!({"id": 3, "center": {"lat": 2.0, "lon": 2.0}})),
        ];

        let ids: Vec<PlaceId> = normalize_all(features).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PlaceId::Numeric(1), PlaceId::Numeric(3)]);
    }
}
