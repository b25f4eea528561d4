//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, or from the first standard
    /// location that exists, or fall back to defaults.
    ///
    /// An explicit path that does not exist is an error; missing files in the
    /// standard locations are not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        schema
            .validate()
            .context(format!("While validating {}", display_path(config_path.as_deref())))?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "default configuration".to_string(), |p| p.display().to_string())
}

/// Standard locations, most specific first
fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("safealert.toml"),
        PathBuf::from(".safealert.toml"),
        PathBuf::from(".config/safealert.toml"),
    ];

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("safealert").join("config.toml"));
    }

    candidates
}

fn find_config_file() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}
