//! Weather service clients: the Open-Meteo historical archive and Radar
//! forward geocoding.
//!
//! Both clients are synchronous (`reqwest::blocking`) and implement the
//! executor's collaborator traits, [`WeatherSource`](weather_query_core::WeatherSource)
//! and [`Geocoder`](weather_query_core::Geocoder). Requests are made once;
//! there are no retries.
mod archive;
mod config;
mod error;
mod geocode;

pub use archive::{ArchiveClient, decode_series, variable_for};
pub use config::{ClientConfig, DEFAULT_ARCHIVE_URL, DEFAULT_GEOCODE_URL};
pub use error::{Service, WeatherError};
pub use geocode::{GeocodeClient, decode_forward};

use reqwest::blocking::RequestBuilder;
use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorBody {
    reason: Option<String>,
}

/// Send `request` and return the body of a successful response.
fn read_body(service: Service, request: RequestBuilder) -> Result<String, WeatherError> {
    let response = request
        .send()
        .map_err(|source| WeatherError::Request { service, source })?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|source| WeatherError::Request { service, source })?;
    if !status.is_success() {
        let reason = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.reason);
        tracing::debug!(%service, status = status.as_u16(), ?reason, "request rejected");
        return Err(WeatherError::Status {
            service,
            status: status.as_u16(),
            reason,
        });
    }
    Ok(body)
}
