//! Great-circle distance between two positions

use super::{print_json, Context};
use anyhow::Result;
use safealert_geo::{distance, Coordinate};
use serde_json::json;

pub fn run(ctx: &Context, from: Coordinate, to: Coordinate) -> Result<()> {
    let meters = distance(&from, &to);

    if ctx.is_json() {
        return print_json(&json!({ "from": from, "to": to, "distance_m": meters }));
    }

    println!("{meters:.0} m");
    Ok(())
}
