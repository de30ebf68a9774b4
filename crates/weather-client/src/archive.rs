//! Open-Meteo historical archive client.

use reqwest::blocking::Client;
use serde::Deserialize;
use weather_query_core::{Coordinates, ServiceError, WeatherSource};
use weather_query_dataset::Aggregate;

use crate::error::{Service, WeatherError};
use crate::{ClientConfig, read_body};

/// Archive `daily` variable for a dataset row.
///
/// `None` for rows the archive does not carry, including
/// `precipitation_probability_max`.
pub fn variable_for(row: &str) -> Option<&'static str> {
    Some(match row {
        "weather_code" => "weather_code",
        "temperature_max" => "temperature_2m_max",
        "temperature_min" => "temperature_2m_min",
        "precipitation_sum" => "precipitation_sum",
        "wind_speed_max" => "wind_gusts_10m_max",
        _ => return None,
    })
}

#[derive(Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    daily: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Extract the daily series for `variable` from an archive response body.
///
/// Null entries are skipped. A missing, null or all-null series is
/// [`WeatherError::NoHistoricalData`].
pub fn decode_series(body: &str, variable: &str) -> Result<Vec<f64>, WeatherError> {
    let response: ArchiveResponse =
        serde_json::from_str(body).map_err(|source| WeatherError::Decode {
            service: Service::Archive,
            source,
        })?;
    let missing = || WeatherError::NoHistoricalData {
        variable: variable.to_string(),
    };
    let series = response
        .daily
        .as_ref()
        .and_then(|daily| daily.get(variable))
        .and_then(|v| v.as_array())
        .ok_or_else(missing)?;
    let values: Vec<f64> = series.iter().filter_map(serde_json::Value::as_f64).collect();
    if values.is_empty() {
        return Err(missing());
    }
    Ok(values)
}

/// Blocking client for `GET {archive_url}?latitude&longitude&start_date&end_date&daily=…`.
///
/// Units are requested in Fahrenheit, mph and inches to match the dataset.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: Client,
    url: String,
}

impl ArchiveClient {
    /// Client for the archive endpoint in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, WeatherError> {
        Ok(Self::with_http(config.http_client()?, &config.archive_url))
    }

    /// Client over an existing HTTP client.
    pub fn with_http(http: Client, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    /// Daily values of `row` at `at` over the inclusive ISO date range.
    pub fn series(
        &self,
        at: Coordinates,
        row: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<f64>, WeatherError> {
        let variable =
            variable_for(row).ok_or_else(|| WeatherError::UnsupportedRow(row.to_string()))?;
        tracing::debug!(
            url = %self.url,
            latitude = at.latitude,
            longitude = at.longitude,
            start,
            end,
            variable,
            "archive request"
        );
        let request = self.http.get(&self.url).query(&[
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("daily", variable.to_string()),
            ("temperature_unit", "fahrenheit".to_string()),
            ("wind_speed_unit", "mph".to_string()),
            ("precipitation_unit", "inch".to_string()),
        ]);
        let body = read_body(Service::Archive, request)?;
        decode_series(&body, variable).inspect_err(|e| {
            if matches!(e, WeatherError::NoHistoricalData { .. }) {
                tracing::warn!(variable, start, end, "no historical data");
            }
        })
    }

    /// Reduce the archived series with `kind`.
    pub fn aggregate(
        &self,
        at: Coordinates,
        kind: Aggregate,
        row: &str,
        start: &str,
        end: &str,
    ) -> Result<f64, WeatherError> {
        let values = self.series(at, row, start, end)?;
        kind.apply(&values)
            .ok_or_else(|| WeatherError::NoHistoricalData {
                variable: row.to_string(),
            })
    }
}

impl WeatherSource for ArchiveClient {
    fn fetch_aggregate(
        &self,
        at: Coordinates,
        kind: Aggregate,
        row: &str,
        start: &str,
        end: &str,
    ) -> Result<f64, ServiceError> {
        Ok(self.aggregate(at, kind, row, start, end)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_to_archive_variables() {
        assert_eq!(variable_for("temperature_max"), Some("temperature_2m_max"));
        assert_eq!(variable_for("wind_speed_max"), Some("wind_gusts_10m_max"));
        assert_eq!(variable_for("weather_code"), Some("weather_code"));
        assert_eq!(variable_for("precipitation_probability_max"), None);
        assert_eq!(variable_for("humidity"), None);
    }

    #[test]
    fn decodes_daily_series() {
        let body = r#"{
            "latitude": 38.9,
            "longitude": -94.7,
            "daily_units": {"time": "iso8601", "temperature_2m_max": "°F"},
            "daily": {
                "time": ["2024-04-24", "2024-04-25"],
                "temperature_2m_max": [71.3, 77.9]
            }
        }"#;
        assert_eq!(
            decode_series(body, "temperature_2m_max").unwrap(),
            [71.3, 77.9]
        );
    }

    #[test]
    fn null_entries_are_skipped() {
        let body = r#"{"daily": {"precipitation_sum": [null, 0.2, null]}}"#;
        assert_eq!(decode_series(body, "precipitation_sum").unwrap(), [0.2]);
    }

    #[test]
    fn missing_or_null_series_is_no_data() {
        for body in [
            r#"{}"#,
            r#"{"daily": null}"#,
            r#"{"daily": {"time": []}}"#,
            r#"{"daily": {"weather_code": null}}"#,
            r#"{"daily": {"weather_code": [null, null]}}"#,
        ] {
            let err = decode_series(body, "weather_code").unwrap_err();
            assert!(
                matches!(err, WeatherError::NoHistoricalData { .. }),
                "{body}: {err}"
            );
        }
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_series("<html>", "weather_code").unwrap_err();
        assert!(matches!(err, WeatherError::Decode { .. }));
    }
}
