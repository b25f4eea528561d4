//! Manual alert for one chosen facility from the nearby list

use super::panic::{alert_client, deliver};
use super::{fetch_places, Context};
use anyhow::Result;
use safealert_api_client::{AlertPayload, MANUAL_NOTE};
use safealert_geo::Coordinate;
use std::path::Path;
use tracing::info;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    ctx: &Context,
    position: Coordinate,
    place_id: &str,
    radius: Option<u32>,
    categories: &[String],
    input: Option<&Path>,
    endpoint: Option<String>,
    note: Option<String>,
) -> Result<()> {
    let query = ctx.search_query(position, radius, categories)?;
    let places = fetch_places(ctx, &query, input).await?;

    let Some(place) = places.iter().find(|p| p.id.to_string() == place_id) else {
        return Err(safealert_core::Error::validation(format!(
            "No place with id {place_id} within {} m",
            query.radius_m()
        ))
        .with_suggestion("Run `safealert --format json nearby` to list the ids in range")
        .into());
    };

    info!(place_id, name = %place.name, "Sending manual alert");

    let payload = AlertPayload::new(
        position,
        Some(place.annotate(&position)),
        note.unwrap_or_else(|| MANUAL_NOTE.to_string()),
    );
    let client = alert_client(ctx, endpoint)?;
    deliver(ctx, &client, &payload, "Alert sent!").await
}
