//! CLI command implementations

pub mod distance;
pub mod nearby;
pub mod nearest;
pub mod panic;
pub mod send;

use crate::OutputFormat;
use anyhow::Result;
use safealert_api_client::{ClientConfig, OverpassQuery, QueryOutcome, SafealertClient};
use safealert_core::config::{is_valid_category, Config, ConfigSchema};
use safealert_geo::{parse_response, Coordinate, Place};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Settings shared by every command
pub struct Context {
    pub settings: ConfigSchema,
    pub client: ClientConfig,
    pub format: OutputFormat,
}

impl Context {
    /// Merge the config file, environment and command-line overrides
    pub fn load(config_path: Option<&Path>, overpass_url: Option<String>, format: OutputFormat) -> Result<Self> {
        let config = Config::load(config_path)?;
        if let Some(path) = &config.path {
            debug!(path = %path.display(), "Loaded configuration");
        }

        let mut client = ClientConfig::from_env().map_err(safealert_core::Error::from)?;
        if let Some(url) = overpass_url {
            client = client.with_overpass_url(url);
        }
        if let Some(url) = &config.schema.alert.endpoint {
            client = client.with_alert_url(url.clone());
        }

        Ok(Self {
            settings: config.schema,
            client,
            format,
        })
    }

    /// Build an HTTP client from the merged configuration
    pub fn http_client(&self) -> Result<SafealertClient> {
        Ok(SafealertClient::with_config(self.client.clone()).map_err(safealert_core::Error::from)?)
    }

    /// Query around `position`, falling back to configured radius and categories.
    ///
    /// Bad input is reported with the coded validation errors.
    pub fn search_query(
        &self,
        position: Coordinate,
        radius: Option<u32>,
        categories: &[String],
    ) -> safealert_core::Result<OverpassQuery> {
        let search = &self.settings.search;
        let categories: &[String] = if categories.is_empty() {
            &search.categories
        } else {
            categories
        };
        let radius = radius.unwrap_or(search.radius_m);

        if !position.is_valid() {
            return Err(safealert_core::Error::invalid_coordinate(position.latitude, position.longitude));
        }
        if radius == 0 {
            return Err(safealert_core::Error::invalid_radius(radius));
        }
        if let Some(bad) = categories.iter().find(|c| !is_valid_category(c)) {
            return Err(safealert_core::Error::invalid_category(bad));
        }

        Ok(OverpassQuery::new(position, radius)
            .with_categories(categories.iter().cloned())
            .with_timeout(search.server_timeout_secs))
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// Places for `query`, from `input` when given, otherwise from the service.
///
/// Service failures are errors here; only the watch session swallows them.
pub async fn fetch_places(ctx: &Context, query: &OverpassQuery, input: Option<&Path>) -> Result<Vec<Place>> {
    if let Some(path) = input {
        let body = std::fs::read_to_string(path)
            .map_err(|e| safealert_core::Error::from(e).with_context(format!("Reading {}", path.display())))?;
        // A saved response may cover more ground than the requested radius
        let radius = f64::from(query.radius_m());
        let center = query.center();
        let places = parse_response(&body)?
            .into_iter()
            .filter(|p| p.distance_from(&center) <= radius)
            .collect();
        return Ok(places);
    }

    let outcome = ctx
        .http_client()?
        .overpass()
        .try_run(query)
        .await
        .map_err(safealert_core::Error::from)?;

    Ok(match outcome {
        QueryOutcome::Found(places) => places,
        QueryOutcome::Empty => Vec::new(),
    })
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
