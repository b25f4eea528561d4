//! Configuration loading and schema definitions
//!
//! Settings for the search radius, facility categories, alert defaults and
//! logging, read from a TOML file with defaults for every field.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
