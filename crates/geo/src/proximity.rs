//! Nearest-place resolution and proximity ranking.
//!
//! All functions borrow the input slice and leave it untouched. Ties are
//! resolved by input order: the first-encountered place wins `nearest`, and
//! `rank` uses a stable sort.

use crate::batch::distances;
use crate::{AnnotatedPlace, Coordinate, Place};
use std::cmp::Ordering;

/// Finds the place closest to `user`.
///
/// Returns `None` for an empty slice. Among equidistant places the first one
/// in `places` is returned.
pub fn nearest(user: &Coordinate, places: &[Place]) -> Option<AnnotatedPlace> {
    let mut best: Option<(&Place, f64)> = None;

    for place in places {
        let d = place.distance_from(user);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((place, d)),
        }
    }

    best.map(|(place, d)| AnnotatedPlace::new(place.clone(), d))
}

/// Returns the places ordered by ascending distance from `user`.
///
/// The sort is stable, so equal distances keep their relative input order.
pub fn rank(user: &Coordinate, places: &[Place]) -> Vec<Place> {
    sorted_by_distance(user, places)
        .into_iter()
        .map(|(_, place)| place.clone())
        .collect()
}

/// Like [`rank`], but attaches each rounded distance so callers need not
/// recompute it for display.
pub fn rank_annotated(user: &Coordinate, places: &[Place]) -> Vec<AnnotatedPlace> {
    sorted_by_distance(user, places)
        .into_iter()
        .map(|(d, place)| AnnotatedPlace::new(place.clone(), d))
        .collect()
}

/// Ranked places no further than `radius_m` meters from `user`.
///
/// Compares the exact distance, not the rounded `distance_m`.
pub fn within_radius(user: &Coordinate, places: &[Place], radius_m: f64) -> Vec<AnnotatedPlace> {
    sorted_by_distance(user, places)
        .into_iter()
        .filter(|(d, _)| *d <= radius_m)
        .map(|(d, place)| AnnotatedPlace::new(place.clone(), d))
        .collect()
}

/// Pairs each place with its exact distance, stably sorted ascending.
fn sorted_by_distance<'a>(user: &Coordinate, places: &'a [Place]) -> Vec<(f64, &'a Place)> {
    let mut keyed: Vec<(f64, &Place)> = distances(user, places).into_iter().zip(places).collect();
    keyed.sort_by(|a, b| compare_distance(a.0, b.0));
    keyed
}

#[inline]
fn compare_distance(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
