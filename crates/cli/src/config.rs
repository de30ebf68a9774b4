//! Configuration file and environment handling.
//!
//! Precedence, highest first: command-line flag, environment, config file,
//! built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use weather_query_client::{ClientConfig, DEFAULT_ARCHIVE_URL, DEFAULT_GEOCODE_URL};

/// Environment variable holding the geocoding API key.
pub(crate) const API_KEY_ENV: &str = "WQ_GEOCODE_API_KEY";

/// Settings read from the JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Dataset file.
    pub(crate) dataset: PathBuf,
    /// Query history file.
    pub(crate) history: PathBuf,
    /// Radar publishable key.
    pub(crate) geocode_api_key: Option<String>,
    /// Geocoding endpoint.
    pub(crate) geocode_url: String,
    /// Archive endpoint.
    pub(crate) archive_url: String,
    /// Request timeout in seconds; absent means no timeout.
    pub(crate) timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("weather.txt"),
            history: PathBuf::from("history.json"),
            geocode_api_key: None,
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load from `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))
    }

    pub(crate) fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply environment overrides through `lookup`.
    pub(crate) fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.geocode_api_key = Some(key);
        }
    }

    /// Settings for the HTTP clients.
    pub(crate) fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_archive_url(&self.archive_url)
            .with_geocode_url(&self.geocode_url)
            .with_geocode_api_key(self.geocode_api_key.clone())
            .with_timeout(self.timeout_secs.map(Duration::from_secs))
    }
}
