//! Radar forward-geocoding client.

use reqwest::blocking::Client;
use serde::Deserialize;
use weather_query_core::{Coordinates, Geocoder, ServiceError};

use crate::error::{Service, WeatherError};
use crate::{ClientConfig, read_body};

#[derive(Deserialize)]
struct ForwardResponse {
    #[serde(default)]
    addresses: Vec<Address>,
}

#[derive(Deserialize)]
struct Address {
    latitude: f64,
    longitude: f64,
}

/// Coordinates of the first address in a forward-geocoding response body.
pub fn decode_forward(body: &str, query: &str) -> Result<Coordinates, WeatherError> {
    let response: ForwardResponse =
        serde_json::from_str(body).map_err(|source| WeatherError::Decode {
            service: Service::Geocode,
            source,
        })?;
    response
        .addresses
        .first()
        .map(|a| Coordinates {
            latitude: a.latitude,
            longitude: a.longitude,
        })
        .ok_or_else(|| WeatherError::NoAddressFound(query.to_string()))
}

/// Blocking client for `GET {geocode_url}?query=…` with the key in
/// `Authorization`.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    url: String,
    api_key: Option<String>,
}

impl GeocodeClient {
    /// Client for the geocoding endpoint and key in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, WeatherError> {
        Ok(Self::with_http(
            config.http_client()?,
            &config.geocode_url,
            config.geocode_api_key.clone(),
        ))
    }

    /// Client over an existing HTTP client.
    pub fn with_http(http: Client, url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.to_string(),
            api_key,
        }
    }

    /// Coordinates of the best match for `query`.
    pub fn forward(&self, query: &str) -> Result<Coordinates, WeatherError> {
        let key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        tracing::debug!(url = %self.url, query, "geocode request");
        let request = self
            .http
            .get(&self.url)
            .query(&[("query", query)])
            .header(reqwest::header::AUTHORIZATION, key);
        let body = read_body(Service::Geocode, request)?;
        decode_forward(&body, query)
    }
}

impl Geocoder for GeocodeClient {
    fn forward(&self, address: &str) -> Result<Coordinates, ServiceError> {
        Ok(GeocodeClient::forward(self, address)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_address() {
        let body = r#"{
            "meta": {"code": 200},
            "addresses": [
                {"latitude": 38.9296, "longitude": -94.7166, "formattedAddress": "Overland Park, KS 66213"},
                {"latitude": 0.0, "longitude": 0.0}
            ]
        }"#;
        let c = decode_forward(body, "66213").unwrap();
        assert_eq!(c.latitude, 38.9296);
        assert_eq!(c.longitude, -94.7166);
    }

    #[test]
    fn empty_result_is_no_address() {
        for body in [r#"{"meta": {"code": 200}, "addresses": []}"#, "{}"] {
            let err = decode_forward(body, "Atlantis").unwrap_err();
            assert_eq!(err.to_string(), "no address found for Atlantis");
        }
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let client = GeocodeClient::with_http(Client::new(), "http://127.0.0.1:9/", None);
        assert!(matches!(
            client.forward("66213"),
            Err(WeatherError::MissingApiKey)
        ));
    }
}
