//! List nearby facilities, nearest first

use super::{fetch_places, print_json, Context};
use crate::view::MapViewState;
use anyhow::Result;
use owo_colors::OwoColorize;
use safealert_geo::{rank_annotated, Coordinate};
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

    let mut view = MapViewState::new(query.radius_m());
    view.set_user_marker(position);
    view.set_markers(&rank_annotated(&position, &places));

    if ctx.is_json() {
        return print_json(&view);
    }

    print_view(&view);
    Ok(())
}

/// Text rendering shared with the watch session
pub fn print_view(view: &MapViewState) {
    if let Some(user) = view.user_marker() {
        println!("{} {}", "You are here:".blue().bold(), user);
    }
    for line in view.render_text().lines() {
        if line.ends_with("(Nearest)") {
            println!("  {}", line.green().bold());
        } else {
            println!("  {line}");
        }
    }
}
