//! Shared fixtures for unit tests

use crate::config::DashboardConfig;
use crate::models::{ForecastSeries, HourlyRecord};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

/// Config pointing both endpoints at `base` with near-zero backoff
pub fn test_config(base: &str) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    config.api.geocoding_base_url = format!("{base}/v1");
    config.api.forecast_base_url = format!("{base}/v1");
    config.api.timeout_seconds = 5;
    config.http.retry_backoff_seconds = 0.001;
    config.http.retry_max_backoff_seconds = 0.01;
    config
}

pub fn geocoding_body() -> Value {
    json!({
        "results": [{
            "id": 4509177,
            "name": "Columbus",
            "latitude": 39.96118,
            "longitude": -82.99879,
            "elevation": 275.0,
            "timezone": "America/New_York",
            "country": "United States",
            "admin1": "Ohio"
        }],
        "generationtime_ms": 0.9
    })
}

/// Open-Meteo style forecast body with `hours` hourly rows starting at `start` (unix seconds)
pub fn forecast_body(start: i64, hours: i64, utc_offset_seconds: i32, wind_direction: f64) -> Value {
    let time: Vec<i64> = (0..hours).map(|h| start + h * 3600).collect();
    let temperature: Vec<f64> = (0..hours).map(|h| 60.0 + h as f64).collect();
    let humidity: Vec<f64> = (0..hours).map(|h| 40.0 + h as f64).collect();
    let precipitation: Vec<f64> = (0..hours).map(|h| (h * 2) as f64).collect();
    let wind_speed: Vec<f64> = (0..hours).map(|h| 5.0 + h as f64 * 0.5).collect();
    let wind_direction: Vec<f64> = (0..hours).map(|_| wind_direction).collect();

    json!({
        "latitude": 39.96,
        "longitude": -83.0,
        "generationtime_ms": 0.1,
        "utc_offset_seconds": utc_offset_seconds,
        "timezone": "America/New_York",
        "timezone_abbreviation": "EDT",
        "elevation": 275.0,
        "hourly_units": {
            "time": "unixtime",
            "temperature_2m": "°F",
            "relative_humidity_2m": "%",
            "precipitation_probability": "%",
            "wind_speed_10m": "mp/h",
            "wind_direction_10m": "°"
        },
        "hourly": {
            "time": time,
            "temperature_2m": temperature,
            "relative_humidity_2m": humidity,
            "precipitation_probability": precipitation,
            "wind_speed_10m": wind_speed,
            "wind_direction_10m": wind_direction
        }
    })
}

/// Hourly series starting at `start`, with temperature equal to the row index
pub fn series_from(start: DateTime<Utc>, hours: i64, utc_offset_seconds: i32) -> ForecastSeries {
    let records = (0..hours)
        .map(|h| HourlyRecord {
            timestamp: start + Duration::hours(h),
            temperature_f: h as f64,
            relative_humidity_pct: 50.0,
            precipitation_probability_pct: 20.0,
            wind_speed_mph: 8.0,
            wind_direction_deg: 95.0,
        })
        .collect();
    ForecastSeries::new(records, utc_offset_seconds, Some(275.0), 3600).unwrap()
}
