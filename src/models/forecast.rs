//! Hourly forecast model

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{DashboardError, Result};

/// Hourly variables understood by the forecast decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourlyVariable {
    #[serde(rename = "temperature_2m")]
    Temperature2m,
    #[serde(rename = "relative_humidity_2m")]
    RelativeHumidity2m,
    PrecipitationProbability,
    #[serde(rename = "wind_speed_10m")]
    WindSpeed10m,
    #[serde(rename = "wind_direction_10m")]
    WindDirection10m,
}

impl HourlyVariable {
    /// Every variable an [`HourlyRecord`] is built from
    pub const ALL: [HourlyVariable; 5] = [
        HourlyVariable::Temperature2m,
        HourlyVariable::RelativeHumidity2m,
        HourlyVariable::PrecipitationProbability,
        HourlyVariable::WindSpeed10m,
        HourlyVariable::WindDirection10m,
    ];

    /// Name used by the API, both in the request and in the response columns
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HourlyVariable::Temperature2m => "temperature_2m",
            HourlyVariable::RelativeHumidity2m => "relative_humidity_2m",
            HourlyVariable::PrecipitationProbability => "precipitation_probability",
            HourlyVariable::WindSpeed10m => "wind_speed_10m",
            HourlyVariable::WindDirection10m => "wind_direction_10m",
        }
    }
}

impl fmt::Display for HourlyVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HourlyVariable {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        HourlyVariable::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| DashboardError::validation(format!("unknown hourly variable '{s}'")))
    }
}

/// One hour of forecast data, imperial units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Start of the hour (UTC)
    pub timestamp: DateTime<Utc>,
    /// Air temperature at 2 m in °F
    pub temperature_f: f64,
    /// Relative humidity at 2 m, 0–100
    pub relative_humidity_pct: f64,
    /// Precipitation probability, 0–100
    pub precipitation_probability_pct: f64,
    /// Wind speed at 10 m in mph
    pub wind_speed_mph: f64,
    /// Wind direction at 10 m, degrees in [0, 360)
    pub wind_direction_deg: f64,
}

/// Validated hourly series for one location.
///
/// Non-empty, strictly increasing timestamps with a constant spacing.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSeries {
    records: Vec<HourlyRecord>,
    /// Offset of the location's local time from UTC, as reported with the forecast
    pub utc_offset_seconds: i32,
    /// Elevation of the forecast grid cell in meters
    pub elevation_m: Option<f64>,
    /// Spacing between records in seconds
    pub interval_seconds: i64,
    /// When this series was retrieved
    pub fetched_at: DateTime<Utc>,
}

impl ForecastSeries {
    /// Build a series, checking ordering and spacing
    pub fn new(
        records: Vec<HourlyRecord>,
        utc_offset_seconds: i32,
        elevation_m: Option<f64>,
        interval_seconds: i64,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(DashboardError::fetch("forecast series is empty"));
        }
        if interval_seconds <= 0 {
            return Err(DashboardError::fetch(format!(
                "invalid series interval {interval_seconds}s"
            )));
        }

        for pair in records.windows(2) {
            let step = (pair[1].timestamp - pair[0].timestamp).num_seconds();
            if step != interval_seconds {
                return Err(DashboardError::fetch(format!(
                    "series is not evenly spaced: {} -> {} ({}s, expected {}s)",
                    pair[0].timestamp, pair[1].timestamp, step, interval_seconds
                )));
            }
        }

        Ok(Self {
            records,
            utc_offset_seconds,
            elevation_m,
            interval_seconds,
            fetched_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn records(&self) -> &[HourlyRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed series
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The series' UTC offset as a chrono offset
    pub fn fixed_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            DashboardError::time_resolution(format!(
                "UTC offset {}s is out of range",
                self.utc_offset_seconds
            ))
        })
    }

    /// First timestamp and the exclusive end of the last interval
    #[must_use]
    pub fn time_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.records[0].timestamp;
        let last = self.records[self.records.len() - 1].timestamp;
        (start, last + chrono::Duration::seconds(self.interval_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(timestamp: DateTime<Utc>) -> HourlyRecord {
        HourlyRecord {
            timestamp,
            temperature_f: 70.0,
            relative_humidity_pct: 50.0,
            precipitation_probability_pct: 10.0,
            wind_speed_mph: 5.0,
            wind_direction_deg: 90.0,
        }
    }

    #[test]
    fn test_variable_names_round_trip_through_from_str() {
        for variable in HourlyVariable::ALL {
            assert_eq!(variable.as_str().parse::<HourlyVariable>().unwrap(), variable);
        }
        assert!("visibility".parse::<HourlyVariable>().is_err());
    }

    #[test]
    fn test_variable_serde_name_matches_api_name() {
        let json = serde_json::to_string(&HourlyVariable::PrecipitationProbability).unwrap();
        assert_eq!(json, "\"precipitation_probability\"");
        let json = serde_json::to_string(&HourlyVariable::Temperature2m).unwrap();
        assert_eq!(json, "\"temperature_2m\"");
    }

    #[test]
    fn test_series_rejects_empty() {
        assert!(ForecastSeries::new(Vec::new(), 0, None, 3600).is_err());
    }

    #[test]
    fn test_series_rejects_uneven_spacing() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let records = vec![
            record_at(t0),
            record_at(t0 + chrono::Duration::hours(1)),
            record_at(t0 + chrono::Duration::hours(3)),
        ];
        assert!(ForecastSeries::new(records, 0, None, 3600).is_err());
    }

    #[test]
    fn test_series_rejects_duplicates() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let records = vec![record_at(t0), record_at(t0)];
        assert!(ForecastSeries::new(records, 0, None, 3600).is_err());
    }

    #[test]
    fn test_time_range_is_half_open() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let records = (0..24)
            .map(|h| record_at(t0 + chrono::Duration::hours(h)))
            .collect();
        let series = ForecastSeries::new(records, -14400, Some(275.0), 3600).unwrap();

        let (start, end) = series.time_range();
        assert_eq!(start, t0);
        assert_eq!(end, t0 + chrono::Duration::hours(24));
        assert_eq!(series.len(), 24);
        assert_eq!(series.fixed_offset().unwrap().local_minus_utc(), -14400);
    }
}
