//! Place records and their distance-annotated form.

use crate::{distance, Coordinate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category used when a feature carries no `amenity` tag.
pub const FALLBACK_CATEGORY: &str = "place";

/// Name used when a feature carries neither `name` nor `official_name`.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Identifier assigned by the geodata source. Unique per dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceId {
    /// Numeric identifier (OSM element ids)
    Numeric(i64),
    /// Opaque string identifier
    Text(String),
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceId::Numeric(id) => write!(f, "{id}"),
            PlaceId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for PlaceId {
    fn from(id: i64) -> Self {
        PlaceId::Numeric(id)
    }
}

impl From<i32> for PlaceId {
    fn from(id: i32) -> Self {
        PlaceId::Numeric(i64::from(id))
    }
}

impl From<String> for PlaceId {
    fn from(id: String) -> Self {
        PlaceId::Text(id)
    }
}

impl From<&str> for PlaceId {
    fn from(id: &str) -> Self {
        PlaceId::Text(id.to_string())
    }
}

/// A normalized emergency facility.
///
/// `location` is always present; features without coordinates never become a
/// `Place`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    /// Amenity tag such as `hospital`, `pharmacy`, `clinic`, or `place`
    pub category: String,
    pub name: String,
    pub location: Coordinate,
    /// Source tags, kept verbatim
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Place {
    /// Creates a place with no attributes.
    pub fn new(
        id: impl Into<PlaceId>,
        category: impl Into<String>,
        name: impl Into<String>,
        location: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            name: name.into(),
            location,
            attributes: BTreeMap::new(),
        }
    }

    /// Attaches source tags.
    #[must_use]
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Distance in meters from `from` to this place.
    #[inline]
    pub fn distance_from(&self, from: &Coordinate) -> f64 {
        distance(from, &self.location)
    }

    /// Annotates a copy of this place with its rounded distance from `from`.
    pub fn annotate(&self, from: &Coordinate) -> AnnotatedPlace {
        AnnotatedPlace::new(self.clone(), self.distance_from(from))
    }
}

/// A place together with its distance to a reference point.
///
/// Serializes flat, so the JSON is the place's fields plus `distance_m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPlace {
    #[serde(flatten)]
    pub place: Place,
    /// Rounded meters from the reference coordinate
    pub distance_m: u64,
}

impl AnnotatedPlace {
    /// Wraps `place`, rounding `meters` to the nearest whole meter.
    pub fn new(place: Place, meters: f64) -> Self {
        Self {
            place,
            distance_m: round_meters(meters),
        }
    }
}

#[inline]
fn round_meters(meters: f64) -> u64 {
    if meters.is_finite() && meters > 0.0 {
        meters.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_id_display() {
        assert_eq!(PlaceId::from(42).to_string(), "42");
        assert_eq!(PlaceId::from("node/7").to_string(), "node/7");
    }

    #[test]
    fn test_place_id_untagged_serde() {
        let numeric: PlaceId = serde_json::from_str("123").unwrap();
        assert_eq!(numeric, PlaceId::Numeric(123));

        let text: PlaceId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(text, PlaceId::Text("abc".to_string()));
    }

    #[test]
    fn test_annotate_rounds_distance() {
        let user = Coordinate::new(12.9716, 77.5946);
        let place = Place::new(2, "pharmacy", "Corner Pharmacy", Coordinate::new(12.9720, 77.5946));

        let annotated = place.annotate(&user);
        assert_eq!(annotated.distance_m, 44);
        assert_eq!(annotated.place, place);
    }

    #[test]
    fn test_annotated_place_serializes_flat() {
        let place = Place::new(7, "hospital", "General", Coordinate::new(1.0, 2.0));
        let json = serde_json::to_value(AnnotatedPlace::new(place, 1234.4)).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "General");
        assert_eq!(json["category"], "hospital");
        assert_eq!(json["distance_m"], 1234);
    }

    #[test]
    fn test_round_meters_guards_non_finite() {
        assert_eq!(round_meters(f64::NAN), 0);
        assert_eq!(round_meters(-3.0), 0);
        assert_eq!(round_meters(2.5), 3);
    }
}
