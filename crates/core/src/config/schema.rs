//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub alert: AlertConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.search.validate()
    }
}

/// Facility search settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Radius in meters for the nearby list
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,

    /// Radius in meters used when the panic button is pressed
    #[serde(default = "default_panic_radius_m")]
    pub panic_radius_m: u32,

    /// Amenity categories to search for
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Server-side execution budget sent with each geodata query
    #[serde(default = "default_server_timeout_secs")]
    pub server_timeout_secs: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_m: default_radius_m(),
            panic_radius_m: default_panic_radius_m(),
            categories: default_categories(),
            server_timeout_secs: default_server_timeout_secs(),
        }
    }
}

impl SearchConfig {
    /// Reject zero radii, empty category sets and categories that would
    /// break the generated query
    pub fn validate(&self) -> Result<()> {
        if self.radius_m == 0 || self.panic_radius_m == 0 {
            return Err(Error::config_invalid("search radius must be a positive number of meters"));
        }

        if self.server_timeout_secs == 0 {
            return Err(Error::config_invalid("server_timeout_secs must be positive"));
        }

        if self.categories.is_empty() {
            return Err(Error::config_invalid("at least one search category is required")
                .with_suggestion("Use categories = [\"hospital\", \"clinic\", \"pharmacy\"]"));
        }

        if let Some(bad) = self.categories.iter().find(|c| !is_valid_category(c)) {
            return Err(Error::config_invalid(format!("invalid category {bad:?}"))
                .with_suggestion("Categories may only contain letters, digits, '_' and '-'"));
        }

        Ok(())
    }
}

/// Returns true if `category` is safe to embed in a tag filter.
pub fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn default_radius_m() -> u32 {
    3000
}

fn default_panic_radius_m() -> u32 {
    2000
}

fn default_categories() -> Vec<String> {
    vec!["hospital".to_string(), "clinic".to_string(), "pharmacy".to_string()]
}

fn default_server_timeout_secs() -> u32 {
    25
}

/// Alert defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertConfig {
    /// Endpoint receiving alert payloads (overrides the client default)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Note attached to panic alerts
    #[serde(default = "default_note")]
    pub note: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            note: default_note(),
        }
    }
}

fn default_note() -> String {
    "Panic button pressed".to_string()
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}
