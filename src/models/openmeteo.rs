//! `OpenMeteo` API response structures

use serde::Deserialize;
use std::collections::HashMap;

/// Geocoding response from `OpenMeteo`; `results` is absent when nothing matched
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
    pub timezone: Option<String>,
    pub elevation: Option<f64>,
}

/// Hourly forecast response, requested with `timeformat=unixtime`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub utc_offset_seconds: i32,
    pub timezone: Option<String>,
    pub hourly: Option<HourlyData>,
}

/// Columnar hourly block: a shared time axis plus one array per variable, keyed by name
#[derive(Debug, Deserialize)]
pub struct HourlyData {
    /// Unix seconds (UTC)
    pub time: Vec<i64>,
    #[serde(flatten)]
    pub columns: HashMap<String, Vec<Option<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocoding_without_results() {
        let response: GeocodingResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.5}"#).unwrap();
        assert!(response.results.is_none());
    }

    #[test]
    fn test_hourly_columns_are_keyed_by_name() {
        let response: ForecastResponse = serde_json::from_str(
            r#"{
                "latitude": 39.96, "longitude": -83.0, "elevation": 275.0,
                "utc_offset_seconds": -14400, "timezone": "America/New_York",
                "hourly_units": {"time": "unixtime", "temperature_2m": "°F"},
                "hourly": {
                    "time": [1717214400, 1717218000],
                    "wind_direction_10m": [95, null],
                    "temperature_2m": [71.2, 70.5]
                }
            }"#,
        )
        .unwrap();

        let hourly = response.hourly.unwrap();
        assert_eq!(hourly.time.len(), 2);
        assert_eq!(hourly.columns["temperature_2m"], vec![Some(71.2), Some(70.5)]);
        assert_eq!(hourly.columns["wind_direction_10m"], vec![Some(95.0), None]);
        assert!(!hourly.columns.contains_key("time"));
    }
}
