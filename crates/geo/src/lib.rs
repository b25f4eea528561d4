//! Geospatial core for SafeAlert.
//!
//! This crate provides:
//! - Haversine distance calculations
//! - Normalization of raw geodata features into [`Place`] records
//! - Nearest-place resolution and proximity ranking
//! - Batch annotation with optional parallelism
//!
//! # Example
//!
//! ```
//! use safealert_geo::{nearest, rank, Coordinate, Place};
//!
//! let user = Coordinate::new(12.9716, 77.5946);
//! let places = vec![
//!     Place::new(1, "hospital", "City Hospital", Coordinate::new(12.9750, 77.5946)),
//!     Place::new(2, "pharmacy", "Corner Pharmacy", Coordinate::new(12.9720, 77.5946)),
//! ];
//!
//! let closest = nearest(&user, &places).unwrap();
//! assert_eq!(closest.place.name, "Corner Pharmacy");
//!
//! let ranked = rank(&user, &places);
//! assert_eq!(ranked[0].name, "Corner Pharmacy");
//! ```

mod haversine;
mod place;
mod proximity;
pub mod batch;
pub mod normalize;
mod error;

use std::fmt;
use std::str::FromStr;

pub use haversine::{
    approximate_distance, distance, haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM,
    EARTH_RADIUS_M,
};
pub use place::{AnnotatedPlace, Place, PlaceId, FALLBACK_CATEGORY, UNKNOWN_NAME};
pub use proximity::{nearest, rank, rank_annotated, within_radius};
pub use normalize::{normalize, normalize_all, normalize_value, parse_response, RawFeature};
pub use batch::{annotate_all, distances};
pub use error::{GeoError, GeoErrorCode, Result};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting out-of-range or non-finite values.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "latitude {latitude} / longitude {longitude} out of range"
            )))
        }
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"` (whitespace around either part is ignored).
impl FromStr for Coordinate {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| GeoError::InvalidCoordinate(format!("expected \"lat,lon\", got {s:?}")))?;

        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("bad latitude {lat:?}")))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("bad longitude {lon:?}")))?;

        Self::try_new(lat, lon)
    }
}
