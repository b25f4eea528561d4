//! Watch session: follow a stream of positions, last request wins
//!
//! Each `lat,lon` line on stdin starts a geodata query tagged with a
//! [`RequestTicket`]. Queries run concurrently; a completion is drawn only if
//! no newer position has arrived since it was issued.

use crate::commands::nearby::print_view;
use crate::commands::{print_json, Context};
use crate::view::MapViewState;
use anyhow::Result;
use owo_colors::OwoColorize;
use safealert_api_client::{OverpassQuery, RequestSequencer, RequestTicket, SafealertClient};
use safealert_geo::{rank_annotated, Coordinate};
use safealert_telemetry::{metrics, names};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub async fn run(ctx: &Context, radius: Option<u32>, categories: &[String]) -> Result<()> {
    let client = ctx.http_client()?;
    let sequencer: Arc<RequestSequencer<MapViewState>> = Arc::new(RequestSequencer::new());
    let json = ctx.is_json();
    let mut tasks = JoinSet::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let position: Coordinate = match line.parse() {
            Ok(position) => position,
            Err(e) => {
                eprintln!("{} {}", "Skipping:".yellow().bold(), e);
                continue;
            }
        };

        let query = match ctx.search_query(position, radius, categories) {
            Ok(query) => query,
            Err(e) => {
                eprintln!("{} {}", "Skipping:".yellow().bold(), e);
                continue;
            }
        };
        let ticket = sequencer.next();
        debug!(seq = ticket.seq(), position = %position, "Position update");

        tasks.spawn(refresh(client.clone(), Arc::clone(&sequencer), ticket, query, json));
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "Watch task failed");
        }
    }

    Ok(())
}

/// Query, rank and draw one position if it is still the latest
async fn refresh(
    client: SafealertClient,
    sequencer: Arc<RequestSequencer<MapViewState>>,
    ticket: RequestTicket,
    query: OverpassQuery,
    json: bool,
) {
    let position = query.center();
    let places = match client.overpass().try_run(&query).await {
        Ok(outcome) => outcome.into_places(),
        Err(e) => {
            warn!(seq = ticket.seq(), error = %e, "Geodata query failed, showing no places");
            Vec::new()
        }
    };

    let mut view = MapViewState::new(query.radius_m());
    view.set_user_marker(position);
    view.set_markers(&rank_annotated(&position, &places));

    publish(&sequencer, ticket, view, |view| draw(view, json));
}

/// Hand `view` to `draw` if `ticket` is still the latest position.
///
/// Drawing happens while the sequencer slot is held, so a newer result is
/// always drawn after an older one.
fn publish(
    sequencer: &RequestSequencer<MapViewState>,
    ticket: RequestTicket,
    view: MapViewState,
    draw: impl FnOnce(&MapViewState),
) -> bool {
    let applied = sequencer.try_complete_with(ticket, view, |view| {
        debug!(
            seq = ticket.seq(),
            nearest = view.nearest().map(|m| m.place.place.name.as_str()),
            "Drawing result"
        );
        draw(view);
    });

    if !applied {
        metrics().increment(names::STALE_RESPONSES);
        debug!(seq = ticket.seq(), "Discarding stale result");
    }
    applied
}

fn draw(view: &MapViewState, json: bool) {
    if json {
        if let Err(e) = print_json(view) {
            warn!(error = %e, "Failed to print result");
        }
    } else {
        print_view(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safealert_geo::{AnnotatedPlace, Place};
    use std::sync::Mutex;
    use std::time::Duration;

    fn view_at(name: &str) -> MapViewState {
        let user = Coordinate::new(12.9716, 77.5946);
        let place = Place::new(1, "clinic", name, Coordinate::new(12.9720, 77.5946));
        let mut view = MapViewState::new(3000);
        view.set_user_marker(user);
        view.set_markers(&[AnnotatedPlace::new(place, 44.0)]);
        view
    }

    fn drawn_names(log: &Mutex<Vec<String>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn record(log: &Mutex<Vec<String>>, view: &MapViewState) {
        let name = view.nearest().map(|m| m.place.place.name.clone()).unwrap_or_default();
        log.lock().unwrap().push(name);
    }

    #[test]
    fn test_late_completion_of_older_position_is_not_drawn() {
        let sequencer = RequestSequencer::new();
        let log = Mutex::new(Vec::new());

        let older = sequencer.next();
        let newer = sequencer.next();

        assert!(publish(&sequencer, newer, view_at("Newer"), |v| record(&log, v)));
        assert!(!publish(&sequencer, older, view_at("Older"), |v| record(&log, v)));
        assert_eq!(drawn_names(&log), vec!["Newer"]);
    }

    #[test]
    fn test_newer_position_is_drawn_last() {
        let sequencer = Arc::new(RequestSequencer::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut newer = None;

        let older = sequencer.next();
        let applied = publish(&sequencer, older, view_at("Older"), |v| {
            // The next position arrives and resolves while the older list is being drawn
            let (thread_sequencer, thread_log) = (Arc::clone(&sequencer), Arc::clone(&log));
            newer = Some(std::thread::spawn(move || {
                let ticket = thread_sequencer.next();
                publish(&thread_sequencer, ticket, view_at("Newer"), |v| record(&thread_log, v))
            }));
            std::thread::sleep(Duration::from_millis(50));
            record(&log, v);
        });

        assert!(applied);
        assert!(newer.unwrap().join().unwrap());
        assert_eq!(drawn_names(&log), vec!["Older", "Newer"]);
    }
}
