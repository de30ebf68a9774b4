//! Configuration types for the weather clients.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::WeatherError;

/// Default Open-Meteo archive endpoint.
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Default Radar forward-geocoding endpoint.
pub const DEFAULT_GEOCODE_URL: &str = "https://api.radar.io/v1/geocode/forward";

/// Endpoints, credentials and timeout for both clients.
///
/// Defaults point at the public services with no timeout and no API key.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Archive endpoint URL.
    pub archive_url: String,
    /// Geocoding endpoint URL.
    pub geocode_url: String,
    /// Radar publishable key, sent as the `Authorization` header.
    pub geocode_api_key: Option<String>,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            geocode_api_key: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Set the archive endpoint.
    pub fn with_archive_url(mut self, url: impl Into<String>) -> Self {
        self.archive_url = url.into();
        self
    }

    /// Set the geocoding endpoint.
    pub fn with_geocode_url(mut self, url: impl Into<String>) -> Self {
        self.geocode_url = url.into();
        self
    }

    /// Set the geocoding API key.
    pub fn with_geocode_api_key(mut self, key: Option<String>) -> Self {
        self.geocode_api_key = key;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the shared blocking HTTP client.
    pub fn http_client(&self) -> Result<Client, WeatherError> {
        // The blocking client defaults to a 30s limit; `None` disables it.
        Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(WeatherError::Client)
    }
}
