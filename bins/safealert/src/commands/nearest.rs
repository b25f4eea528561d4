//! Single nearest facility

use super::{fetch_places, print_json, Context};
use anyhow::Result;
use owo_colors::OwoColorize;
use safealert_geo::{nearest, Coordinate};
use serde_json::json;
use std::path::Path;

pub async fn run(
    ctx: &Context,
    position: Coordinate,
    radius: Option<u32>,
    categories: &[String],
    input: Option<&Path>,
) -> Result<()> {
    let query = ctx.search_query(position, radius, categories)?;
    let places = fetch_places(ctx, &query, input).await?;
    let closest = nearest(&position, &places);

    if ctx.is_json() {
        return print_json(&json!({ "user": position, "nearest_place": closest }));
    }

    match closest {
        Some(found) => println!(
            "{} ({}) - {} m",
            found.place.name.green().bold(),
            found.place.category,
            found.distance_m
        ),
        None => println!("No nearby places found within {} m.", query.radius_m()),
    }
    Ok(())
}
