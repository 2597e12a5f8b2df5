//! Hourly forecast retrieval and decoding
//!
//! The OpenMeteo response is columnar: one shared time axis plus one array per
//! requested variable. Columns are looked up by name and validated against the
//! requested variable list, so request order never influences decoding.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::DateTime;
use tracing::{debug, info, instrument};

use crate::models::openmeteo::ForecastResponse;
use crate::models::{ForecastSeries, HourlyRecord, HourlyVariable, Location};
use crate::{DashboardError, Result, WeatherApiClient};

/// Spacing assumed when the axis has a single timestamp
const DEFAULT_INTERVAL_SECONDS: i64 = 3600;
/// Longest forecast the upstream API serves
pub const MAX_FORECAST_DAYS: u8 = 16;

/// Anything that can produce an hourly forecast series for a location
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_hourly(
        &self,
        location: &Location,
        variables: &[HourlyVariable],
        days: u8,
    ) -> Result<ForecastSeries>;
}

/// Forecast fetcher backed by the shared API client (cache + retry)
pub struct ForecastService {
    api_client: WeatherApiClient,
}

impl ForecastService {
    #[must_use]
    pub fn new(api_client: WeatherApiClient) -> Self {
        Self { api_client }
    }
}

#[async_trait]
impl ForecastSource for ForecastService {
    #[instrument(skip(self, location, variables), fields(location = %location.name))]
    async fn fetch_hourly(
        &self,
        location: &Location,
        variables: &[HourlyVariable],
        days: u8,
    ) -> Result<ForecastSeries> {
        if days == 0 || days > MAX_FORECAST_DAYS {
            return Err(DashboardError::validation(format!(
                "forecast days must be between 1 and {MAX_FORECAST_DAYS}, got {days}"
            )));
        }

        let variables = dedup_variables(variables);
        ensure_covers_record(&variables)?;

        let response = self
            .api_client
            .forecast(location.latitude, location.longitude, &variables, days)
            .await?;
        let series = decode_series(response, &variables)?;

        info!(
            "Decoded forecast with {} hourly records (offset {}s)",
            series.len(),
            series.utc_offset_seconds
        );
        Ok(series)
    }
}

fn dedup_variables(variables: &[HourlyVariable]) -> Vec<HourlyVariable> {
    let mut unique = Vec::with_capacity(variables.len());
    for variable in variables {
        if !unique.contains(variable) {
            unique.push(*variable);
        }
    }
    unique
}

/// Every record field must be backed by a requested variable
fn ensure_covers_record(variables: &[HourlyVariable]) -> Result<()> {
    let missing: Vec<&str> = HourlyVariable::ALL
        .iter()
        .filter(|v| !variables.contains(v))
        .map(|v| v.as_str())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::fetch(format!(
            "hourly records need variables that were not requested: {}",
            missing.join(", ")
        )))
    }
}

/// Decode the columnar hourly block into a validated series
pub fn decode_series(
    response: ForecastResponse,
    variables: &[HourlyVariable],
) -> Result<ForecastSeries> {
    let hourly = response
        .hourly
        .ok_or_else(|| DashboardError::fetch("response has no hourly data"))?;

    if hourly.time.is_empty() {
        return Err(DashboardError::fetch("response has an empty time axis"));
    }

    let interval_seconds = match hourly.time.as_slice() {
        [first, second, ..] => second.checked_sub(*first).ok_or_else(|| {
            DashboardError::fetch(format!("time axis spacing {first} -> {second} overflows"))
        })?,
        _ => DEFAULT_INTERVAL_SECONDS,
    };
    let columns = take_columns(hourly.columns, variables, hourly.time.len())?;
    let column = |variable: HourlyVariable| -> Result<&Vec<f64>> {
        columns
            .get(&variable)
            .ok_or_else(|| DashboardError::fetch(format!("variable {variable} was not requested")))
    };

    let temperature = column(HourlyVariable::Temperature2m)?;
    let humidity = column(HourlyVariable::RelativeHumidity2m)?;
    let precipitation = column(HourlyVariable::PrecipitationProbability)?;
    let wind_speed = column(HourlyVariable::WindSpeed10m)?;
    let wind_direction = column(HourlyVariable::WindDirection10m)?;

    let records = hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, &seconds)| {
            let timestamp = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
                DashboardError::fetch(format!("timestamp {seconds} is out of range"))
            })?;
            Ok(HourlyRecord {
                timestamp,
                temperature_f: temperature[i],
                relative_humidity_pct: humidity[i],
                precipitation_probability_pct: precipitation[i],
                wind_speed_mph: wind_speed[i],
                wind_direction_deg: wind_direction[i].rem_euclid(360.0),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Decoded {} records at {}s spacing",
        records.len(),
        interval_seconds
    );

    ForecastSeries::new(
        records,
        response.utc_offset_seconds,
        response.elevation,
        interval_seconds,
    )
}

/// Pull each requested column by name, checking length and nulls
fn take_columns(
    mut available: HashMap<String, Vec<Option<f64>>>,
    variables: &[HourlyVariable],
    expected_len: usize,
) -> Result<BTreeMap<HourlyVariable, Vec<f64>>> {
    let mut columns = BTreeMap::new();

    for &variable in variables {
        let raw = available.remove(variable.as_str()).ok_or_else(|| {
            DashboardError::fetch(format!("response is missing requested variable {variable}"))
        })?;

        if raw.len() != expected_len {
            return Err(DashboardError::fetch(format!(
                "variable {variable} has {} values for {expected_len} timestamps",
                raw.len()
            )));
        }

        let values = raw
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                value.ok_or_else(|| {
                    DashboardError::fetch(format!("variable {variable} has no value at row {i}"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        columns.insert(variable, values);
    }

    Ok(columns)
}
