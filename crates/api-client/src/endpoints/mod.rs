//! Endpoint-specific API implementations
//!
//! | Module | Service | Description |
//! |--------|---------|-------------|
//! | `overpass` | Overpass API interpreter | nearby amenity search |
//! | `alert` | alert receiver | panic alert delivery |

pub mod alert;
pub mod overpass;

pub use alert::{AlertAck, AlertApi, AlertPayload, AlertUser, MANUAL_NOTE, PANIC_NOTE};
pub use overpass::{OverpassApi, QueryOutcome};
