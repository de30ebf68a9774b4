//! Typed error types for the weather clients.

/// Which remote service a request went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Open-Meteo historical archive.
    Archive,
    /// Radar forward geocoding.
    Geocode,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Archive => write!(f, "weather archive"),
            Service::Geocode => write!(f, "geocoding service"),
        }
    }
}

/// Failures talking to, or decoding answers from, the remote services.
///
/// Every variant converts into the executor's `ServiceError`, which surfaces
/// as an external-service diagnostic.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    // -- Transport --
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or its body could not be read.
    #[error("request to {service} failed: {source}")]
    Request {
        /// Service the request was for.
        service: Service,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{service} returned HTTP {status}{}", suffix(.reason))]
    Status {
        /// Service the request was for.
        service: Service,
        /// HTTP status code.
        status: u16,
        /// `reason` field of the error body, when present.
        reason: Option<String>,
    },

    // -- Decoding --
    /// The response body was not the expected JSON.
    #[error("malformed {service} response: {source}")]
    Decode {
        /// Service the response came from.
        service: Service,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The archive has no values for the requested variable and range.
    #[error("no historical data for {variable}")]
    NoHistoricalData {
        /// Archive variable that came back missing or empty.
        variable: String,
    },

    /// The row has no counterpart in the archive.
    #[error("row `{0}` is not available in the weather archive")]
    UnsupportedRow(String),

    /// Geocoding found no match for the address.
    #[error("no address found for {0}")]
    NoAddressFound(String),

    // -- Configuration --
    /// Geocoding needs an API key and none was configured.
    #[error("no geocoding API key configured (set WQ_GEOCODE_API_KEY or geocode_api_key)")]
    MissingApiKey,
}

fn suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default()
}
