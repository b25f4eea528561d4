//! Panic alert delivery

use crate::client::SafealertClient;
use crate::error::ApiResult;
use chrono::{SecondsFormat, Utc};
use safealert_geo::{AnnotatedPlace, Coordinate};
use safealert_telemetry::{metrics, names, Event};
use serde::{Deserialize, Serialize};

/// Note attached to alerts raised from the panic flow
pub const PANIC_NOTE: &str = "Panic button pressed";

/// Note attached to alerts sent for a place picked from the list
pub const MANUAL_NOTE: &str = "Manual send of selected place";

/// Where the user was and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertUser {
    pub lat: f64,
    pub lon: f64,
    /// RFC 3339, UTC
    pub timestamp: String,
}

/// Body POSTed to the alert endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub user: AlertUser,
    /// Serialized as `null` when nothing was found nearby
    #[serde(with = "wire_place")]
    pub nearest_place: Option<AnnotatedPlace>,
    pub note: String,
}

impl AlertPayload {
    /// Payload stamped with the current time
    pub fn new(user: Coordinate, nearest_place: Option<AnnotatedPlace>, note: impl Into<String>) -> Self {
        Self {
            user: AlertUser {
                lat: user.latitude,
                lon: user.longitude,
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            nearest_place,
            note: note.into(),
        }
    }
}

/// Place as alert receivers read it: `type` for the category, flat
/// `lat`/`lon`, source `tags`, and the rounded `distance_m`.
mod wire_place {
    use safealert_geo::{AnnotatedPlace, Coordinate, Place, PlaceId};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct WirePlaceRef<'a> {
        id: &'a PlaceId,
        #[serde(rename = "type")]
        category: &'a str,
        name: &'a str,
        lat: f64,
        lon: f64,
        tags: &'a BTreeMap<String, String>,
        distance_m: u64,
    }

    #[derive(Deserialize)]
    struct WirePlace {
        id: PlaceId,
        #[serde(rename = "type")]
        category: String,
        name: String,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: BTreeMap<String, String>,
        #[serde(default)]
        distance_m: u64,
    }

    pub fn serialize<S: Serializer>(value: &Option<AnnotatedPlace>, serializer: S) -> Result<S::Ok, S::Error> {
        value
            .as_ref()
            .map(|annotated| WirePlaceRef {
                id: &annotated.place.id,
                category: &annotated.place.category,
                name: &annotated.place.name,
                lat: annotated.place.location.latitude,
                lon: annotated.place.location.longitude,
                tags: &annotated.place.attributes,
                distance_m: annotated.distance_m,
            })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<AnnotatedPlace>, D::Error> {
        Ok(Option::<WirePlace>::deserialize(deserializer)?.map(|wire| AnnotatedPlace {
            place: Place::new(wire.id, wire.category, wire.name, Coordinate::new(wire.lat, wire.lon))
                .with_attributes(wire.tags),
            distance_m: wire.distance_m,
        }))
    }
}

/// Acknowledgement returned by the alert endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertAck {
    #[serde(default = "default_ack")]
    pub status: String,
    #[serde(default = "default_ack")]
    pub message: String,
}

fn default_ack() -> String {
    "ok".to_string()
}

/// Alert endpoint interface
#[derive(Clone)]
pub struct AlertApi {
    client: SafealertClient,
}

impl AlertApi {
    pub(crate) fn new(client: SafealertClient) -> Self {
        Self { client }
    }

    /// POST `payload` to the configured alert URL
    pub async fn send(&self, payload: &AlertPayload) -> ApiResult<AlertAck> {
        let url = &self.client.config().alert_url;

        match self.client.post_json::<AlertAck, _>(url, payload).await {
            Ok(ack) => {
                metrics().increment(names::ALERTS_SENT);
                Event::new(
                    "alert.sent",
                    serde_json::json!({
                        "status": ack.status,
                        "nearest_place": payload.nearest_place.as_ref().map(|p| &p.place.name),
                        "distance_m": payload.nearest_place.as_ref().map(|p| p.distance_m),
                    }),
                )
                .log();
                Ok(ack)
            }
            Err(e) => {
                metrics().increment(names::ALERTS_FAILED);
                Err(e)
            }
        }
    }
}
