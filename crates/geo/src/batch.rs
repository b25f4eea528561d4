//! Batch distance annotation with optional parallelism.
//!
//! Result lists from a wide-radius query in a dense city can run to several
//! hundred features; with the `parallel` feature the per-place haversine work
//! is spread over rayon's pool. Output order always matches input order.

use crate::{AnnotatedPlace, Coordinate, Place};

/// Exact distances in meters from `user` to each place, in input order.
pub fn distances(user: &Coordinate, places: &[Place]) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        places.par_iter().map(|place| place.distance_from(user)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        places.iter().map(|place| place.distance_from(user)).collect()
    }
}

/// Annotates every place with its rounded distance from `user`.
///
/// # Example
/// ```
/// use safealert_geo::{annotate_all, Coordinate, Place};
///
/// let user = Coordinate::new(0.0, 0.0);
/// let places = vec![Place::new(1, "clinic", "A", Coordinate::new(1.0, 0.0))];
///
/// let annotated = annotate_all(&user, &places);
/// assert_eq!(annotated[0].distance_m, 111_195);
/// ```
pub fn annotate_all(user: &Coordinate, places: &[Place]) -> Vec<AnnotatedPlace> {
    distances(user, places)
        .into_iter()
        .zip(places)
        .map(|(d, place)| AnnotatedPlace::new(place.clone(), d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(count: usize) -> Vec<Place> {
        (0..count)
            .map(|i| {
                let lat = 12.9 + (i as f64 * 0.001) % 0.2;
                let lon = 77.5 + (i as f64 * 0.002) % 0.2;
                Place::new(i as i64, "pharmacy", format!("P{i}"), Coordinate::new(lat, lon))
            })
            .collect()
    }

    #[test]
    fn test_annotate_preserves_order() {
        let user = Coordinate::new(12.9716, 77.5946);
        let places = grid(500);
        let annotated = annotate_all(&user, &places);

        assert_eq!(annotated.len(), places.len());
        for (a, p) in annotated.iter().zip(&places) {
            assert_eq!(a.place.id, p.id);
            assert_eq!(a.distance_m, p.distance_from(&user).round() as u64);
        }
    }

    #[test]
    fn test_annotate_empty() {
        assert!(annotate_all(&Coordinate::new(0.0, 0.0), &[]).is_empty());
    }
}
