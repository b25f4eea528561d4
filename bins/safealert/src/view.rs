//! Map view state: the user marker plus ranked place markers

use safealert_geo::{AnnotatedPlace, Coordinate};
use serde::Serialize;

/// One place pin
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    #[serde(flatten)]
    pub place: AnnotatedPlace,
    pub nearest: bool,
}

/// Everything currently drawn on the map
#[derive(Debug, Clone, Serialize)]
pub struct MapViewState {
    user: Option<Coordinate>,
    markers: Vec<Marker>,
    radius_m: u32,
}

impl MapViewState {
    pub fn new(radius_m: u32) -> Self {
        Self {
            user: None,
            markers: Vec::new(),
            radius_m,
        }
    }

    pub fn set_user_marker(&mut self, position: Coordinate) {
        self.user = Some(position);
    }

    pub fn user_marker(&self) -> Option<Coordinate> {
        self.user
    }

    /// Replace all place markers. `places` must already be ranked; the first
    /// one is flagged nearest.
    pub fn set_markers(&mut self, places: &[AnnotatedPlace]) {
        self.markers = places
            .iter()
            .enumerate()
            .map(|(idx, place)| Marker {
                place: place.clone(),
                nearest: idx == 0,
            })
            .collect();
    }

    pub fn nearest(&self) -> Option<&Marker> {
        self.markers.iter().find(|m| m.nearest)
    }

    /// Plain list lines, `"<name> (<category>) - <d> m"`
    pub fn render_text(&self) -> String {
        if self.markers.is_empty() {
            return format!("No nearby places found within {} m.", self.radius_m);
        }

        self.markers
            .iter()
            .map(|m| {
                let line = format!(
                    "{} ({}) - {} m",
                    m.place.place.name, m.place.place.category, m.place.distance_m
                );
                if m.nearest { format!("{line} (Nearest)") } else { line }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safealert_geo::{rank_annotated, Place};

    fn ranked() -> Vec<AnnotatedPlace> {
        let user = Coordinate::new(12.9716, 77.5946);
        let places = vec![
            Place::new(1, "hospital", "City Hospital", Coordinate::new(12.9750, 77.5946)),
            Place::new(2, "pharmacy", "Corner Pharmacy", Coordinate::new(12.9720, 77.5946)),
        ];
        rank_annotated(&user, &places)
    }

    #[test]
    fn test_render_marks_first_entry_nearest() {
        let mut view = MapViewState::new(3000);
        view.set_markers(&ranked());

        assert_eq!(
            view.render_text(),
            "Corner Pharmacy (pharmacy) - 44 m (Nearest)\nCity Hospital (hospital) - 378 m"
        );
        assert_eq!(view.nearest().map(|m| m.place.place.id.to_string()).as_deref(), Some("2"));
    }

    #[test]
    fn test_set_markers_replaces_previous() {
        let mut view = MapViewState::new(3000);
        view.set_markers(&ranked());
        view.set_markers(&ranked()[1..]);

        assert_eq!(view.render_text(), "City Hospital (hospital) - 378 m (Nearest)");
    }

    #[test]
    fn test_empty_view() {
        let mut view = MapViewState::new(2000);
        view.set_user_marker(Coordinate::new(1.0, 2.0));
        assert_eq!(view.render_text(), "No nearby places found within 2000 m.");
        assert!(view.nearest().is_none());
        assert_eq!(view.user_marker(), Some(Coordinate::new(1.0, 2.0)));
    }
}
