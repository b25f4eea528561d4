//! Panic alert: locate the nearest facility and notify the alert endpoint

use super::{print_json, Context};
use anyhow::Result;
use owo_colors::OwoColorize;
use safealert_api_client::{AlertPayload, SafealertClient};
use safealert_geo::{nearest, Coordinate};
use serde_json::json;
use tracing::{info, warn};

pub async fn run(
    ctx: &Context,
    position: Coordinate,
    note: Option<String>,
    endpoint: Option<String>,
    radius: Option<u32>,
) -> Result<()> {
    let client = alert_client(ctx, endpoint)?;
    let radius = radius.unwrap_or(ctx.settings.search.panic_radius_m);
    let query = ctx.search_query(position, Some(radius), &[])?;

    // An alert without a facility is still worth sending, so the lookup is best-effort
    let places = match client.overpass().try_run(&query).await {
        Ok(outcome) => outcome.into_places(),
        Err(e) => {
            warn!(error = %e, "Geodata query failed, sending alert without a facility");
            Vec::new()
        }
    };
    let closest = nearest(&position, &places);

    info!(
        position = %position,
        radius_m = radius,
        nearest = closest.as_ref().map(|p| p.place.name.as_str()),
        "Sending panic alert"
    );

    let note = note.unwrap_or_else(|| ctx.settings.alert.note.clone());
    let payload = AlertPayload::new(position, closest, note);
    deliver(ctx, &client, &payload, "Panic alert sent!").await?;

    if !ctx.is_json() && payload.nearest_place.is_none() {
        println!("  No facility found within {radius} m.");
    }
    Ok(())
}

/// Client for the configured alert endpoint, or `endpoint` when given
pub(crate) fn alert_client(ctx: &Context, endpoint: Option<String>) -> Result<SafealertClient> {
    let config = match endpoint {
        Some(url) => ctx.client.clone().with_alert_url(url),
        None => ctx.client.clone(),
    };
    Ok(SafealertClient::with_config(config).map_err(safealert_core::Error::from)?)
}

/// POST `payload` and print the acknowledgement under `headline`
pub(crate) async fn deliver(
    ctx: &Context,
    client: &SafealertClient,
    payload: &AlertPayload,
    headline: &str,
) -> Result<()> {
    let ack = client.alerts().send(payload).await.map_err(|e| {
        safealert_core::Error::alert_delivery(e.to_string())
            .with_context(format!("POST {}", client.config().alert_url))
    })?;

    if ctx.is_json() {
        return print_json(&json!({ "payload": payload, "ack": ack }));
    }

    println!("{} Server response: {}", headline.red().bold(), ack.message);
    if let Some(place) = &payload.nearest_place {
        println!(
            "  Nearest: {} ({}) - {} m",
            place.place.name, place.place.category, place.distance_m
        );
    }
    Ok(())
}
