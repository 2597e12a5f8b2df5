//! Submission pipeline and view model assembly
//!
//! A submission runs geocoding, the forecast fetch, local time resolution,
//! row selection and wind classification in order, then packages the result
//! for the presentation layer. Each submission takes a ticket from a sequence
//! counter and records it as the latest for its session; a result is only
//! delivered if no newer submission in the same session started while it was
//! in flight.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::local_time::{local_now_at, select_current};
use crate::location_resolver::LocationLookup;
use crate::models::{ForecastSeries, HourlyRecord, HourlyVariable, Location};
use crate::weather::ForecastSource;
use crate::wind::{ArrowVector, CompassDirection, classify, to_vector};
use crate::Result;

/// The dashboard only ever shows today's conditions
pub const FORECAST_DAYS: u8 = 1;

const THERMOMETER_MIN_F: f64 = -50.0;
const THERMOMETER_MAX_F: f64 = 135.0;
const ARROW_LENGTH: f64 = 1.0;
const COMPASS_AXIS_LIMIT: f64 = 1.5;
/// Session used by [`Dashboard::submit`]
pub const DEFAULT_SESSION: &str = "default";

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A bounded scalar display (dial gauge or thermometer)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub label: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

impl Gauge {
    fn new(label: &str, value: f64, min: f64, max: f64, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            value,
            min,
            max,
            unit: unit.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompassView {
    pub direction: CompassDirection,
    pub label: String,
    pub bearing_deg: f64,
    pub arrow: ArrowVector,
    pub title: String,
    /// Symmetric axis range for both x and y
    pub axis_range: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// UTC instant in epoch milliseconds
    pub x_ms: i64,
    pub wind_speed_mph: f64,
    /// Local wall-clock tick text, `HH:MM`
    pub tick: String,
}

/// Wind speed over the forecast day with a marker at the current instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindChart {
    pub points: Vec<ChartPoint>,
    pub now_marker_ms: i64,
}

/// Everything the presentation layer needs for one submission
#[derive(Debug, Clone, Serialize)]
pub struct DashboardViewModel {
    pub location: Location,
    pub local_time: DateTime<FixedOffset>,
    pub current: HourlyRecord,
    pub popup: Vec<String>,
    pub humidity: Gauge,
    pub precipitation: Gauge,
    pub thermometer: Gauge,
    pub compass: CompassView,
    pub wind_chart: WindChart,
}

/// Outcome of [`Dashboard::submit`]
#[derive(Debug)]
pub enum Submission {
    Current(Box<DashboardViewModel>),
    /// A newer submission in the same session started before this one finished
    Superseded,
}

pub struct Dashboard {
    geocoder: Arc<dyn LocationLookup>,
    forecasts: Arc<dyn ForecastSource>,
    sequence: AtomicU64,
    /// Latest ticket per session; an entry lives only while that session has work in flight
    latest: Mutex<HashMap<String, u64>>,
    clock: Clock,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(geocoder: Arc<dyn LocationLookup>, forecasts: Arc<dyn ForecastSource>) -> Self {
        Self {
            geocoder,
            forecasts,
            sequence: AtomicU64::new(0),
            latest: Mutex::new(HashMap::new()),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, for deterministic runs
    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Run a submission in the default session
    pub async fn submit(&self, query: &str) -> Result<Submission> {
        self.submit_in_session(DEFAULT_SESSION, query).await
    }

    /// Run a submission, discarding its result if a newer one in `session` has started since
    #[instrument(skip(self))]
    pub async fn submit_in_session(&self, session: &str, query: &str) -> Result<Submission> {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_latest().insert(session.to_string(), ticket);

        let result = self.handle_submit(query).await;

        let is_latest = {
            let mut latest = self.lock_latest();
            if latest.get(session) == Some(&ticket) {
                latest.remove(session);
                true
            } else {
                false
            }
        };
        if !is_latest {
            warn!(ticket, "Discarding superseded result for '{}'", query);
            return Ok(Submission::Superseded);
        }

        result.map(|view| Submission::Current(Box::new(view)))
    }

    fn lock_latest(&self) -> std::sync::MutexGuard<'_, HashMap<String, u64>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the full pipeline for one query
    pub async fn handle_submit(&self, query: &str) -> Result<DashboardViewModel> {
        let location = self.geocoder.resolve(query).await?;
        let series = self
            .forecasts
            .fetch_hourly(&location, &HourlyVariable::ALL, FORECAST_DAYS)
            .await?;
        let location = location.with_fallback_offset(series.utc_offset_seconds);

        let local_now = local_now_at(&location, (self.clock)())?;
        let current = select_current(&series, &local_now)?.clone();
        let direction = classify(current.wind_direction_deg)?;

        info!(
            "Current conditions for {}: {}ºF, wind {} mph from {}",
            location.display_name(),
            current.temperature_f,
            current.wind_speed_mph,
            direction
        );

        build_view(location, &series, local_now, current, direction)
    }
}

fn build_view(
    location: Location,
    series: &ForecastSeries,
    local_now: DateTime<FixedOffset>,
    current: HourlyRecord,
    direction: CompassDirection,
) -> Result<DashboardViewModel> {
    let popup = popup_lines(&location, series.elevation_m, &current);
    let wind_chart = wind_chart(series, &local_now)?;

    Ok(DashboardViewModel {
        humidity: Gauge::new("Humidity", current.relative_humidity_pct, 0.0, 100.0, "%"),
        precipitation: Gauge::new(
            "Precip. Probability",
            current.precipitation_probability_pct,
            0.0,
            100.0,
            "%",
        ),
        thermometer: Gauge::new(
            "Temperature",
            current.temperature_f,
            THERMOMETER_MIN_F,
            THERMOMETER_MAX_F,
            "ºF",
        ),
        compass: CompassView {
            direction,
            label: direction.label().to_string(),
            bearing_deg: current.wind_direction_deg,
            arrow: to_vector(current.wind_direction_deg, ARROW_LENGTH),
            title: format!("Wind Direction: {direction}"),
            axis_range: [-COMPASS_AXIS_LIMIT, COMPASS_AXIS_LIMIT],
        },
        wind_chart,
        popup,
        location,
        local_time: local_now,
        current,
    })
}

fn popup_lines(location: &Location, elevation_m: Option<f64>, current: &HourlyRecord) -> Vec<String> {
    let elevation = elevation_m.map_or_else(|| "unknown".to_string(), |m| format!("{m}m asl"));
    vec![
        format!("Location: {}", location.display_name()),
        format!("Coordinates: {}", location.format_coordinates()),
        format!("Elevation: {elevation}"),
        format!("Temperature: {}ºF", current.temperature_f),
        format!("Precip. Probability: {}%", current.precipitation_probability_pct),
    ]
}

fn wind_chart(series: &ForecastSeries, local_now: &DateTime<FixedOffset>) -> Result<WindChart> {
    let offset = series.fixed_offset()?;
    let points = series
        .records()
        .iter()
        .map(|record| ChartPoint {
            x_ms: record.timestamp.timestamp_millis(),
            wind_speed_mph: record.wind_speed_mph,
            tick: record.timestamp.with_timezone(&offset).format("%H:%M").to_string(),
        })
        .collect();

    Ok(WindChart {
        points,
        now_marker_ms: local_now.timestamp_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::series_from;
    use crate::DashboardError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use tokio::sync::Notify;

    struct FakeGeocoder {
        offset: Option<i32>,
    }

    #[async_trait]
    impl LocationLookup for FakeGeocoder {
        async fn resolve(&self, query: &str) -> Result<Location> {
            if query == "Atlantis" {
                return Err(DashboardError::not_found(query));
            }
            Ok(Location {
                name: "Columbus".to_string(),
                admin_region: "Ohio".to_string(),
                country: "United States".to_string(),
                latitude: 39.96118,
                longitude: -82.99879,
                utc_offset_seconds: self.offset,
                timezone: Some("America/New_York".to_string()),
            })
        }
    }

    /// Blocks "slow" queries until released
    struct GatedGeocoder {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl LocationLookup for GatedGeocoder {
        async fn resolve(&self, query: &str) -> Result<Location> {
            if query == "slow" {
                self.entered.notify_one();
                self.release.notified().await;
            }
            let mut location = Location::new(39.96, -83.0, query.to_string());
            location.utc_offset_seconds = Some(-14400);
            Ok(location)
        }
    }

    struct FakeForecast;

    #[async_trait]
    impl ForecastSource for FakeForecast {
        async fn fetch_hourly(
            &self,
            _location: &Location,
            variables: &[HourlyVariable],
            days: u8,
        ) -> Result<ForecastSeries> {
            assert_eq!(variables, HourlyVariable::ALL);
            assert_eq!(days, FORECAST_DAYS);
            Ok(series_from(
                Utc.with_ymd_and_hms(2024, 6, 1, 4, 0, 0).unwrap(),
                24,
                -14400,
            ))
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 18, 37, 0).unwrap()
    }

    fn dashboard(offset: Option<i32>) -> Dashboard {
        Dashboard::new(Arc::new(FakeGeocoder { offset }), Arc::new(FakeForecast))
            .with_clock(fixed_now)
    }

    #[tokio::test]
    async fn test_columbus_submission() {
        let view = dashboard(Some(-14400)).handle_submit("Columbus").await.unwrap();

        assert_eq!(view.current.temperature_f, 14.0);
        assert_eq!(view.local_time.format("%H:%M").to_string(), "14:37");
        assert_eq!(view.compass.direction, CompassDirection::East);
        assert_eq!(view.compass.title, "Wind Direction: East");
        assert_eq!(view.compass.axis_range, [-1.5, 1.5]);
        assert!((view.compass.arrow.dx - 95.0_f64.to_radians().sin()).abs() < 1e-12);

        assert_eq!(
            view.popup,
            vec![
                "Location: Columbus, Ohio, United States",
                "Coordinates: 39.96118°, -82.99879°",
                "Elevation: 275m asl",
                "Temperature: 14ºF",
                "Precip. Probability: 20%",
            ]
        );
        assert_eq!(view.humidity.value, 50.0);
        assert_eq!((view.thermometer.min, view.thermometer.max), (-50.0, 135.0));
    }

    #[tokio::test]
    async fn test_chart_uses_local_ticks_and_utc_positions() {
        let view = dashboard(Some(-14400)).handle_submit("Columbus").await.unwrap();
        let chart = &view.wind_chart;

        assert_eq!(chart.points.len(), 24);
        assert_eq!(chart.points[0].tick, "00:00");
        assert_eq!(chart.points[23].tick, "23:00");
        assert_eq!(
            chart.points[0].x_ms,
            Utc.with_ymd_and_hms(2024, 6, 1, 4, 0, 0).unwrap().timestamp_millis()
        );
        assert_eq!(chart.now_marker_ms, fixed_now().timestamp_millis());
    }

    #[tokio::test]
    async fn test_forecast_offset_fills_missing_location_offset() {
        let view = dashboard(None).handle_submit("Columbus").await.unwrap();
        assert_eq!(view.location.utc_offset_seconds, Some(-14400));
        assert_eq!(view.current.temperature_f, 14.0);
    }

    #[tokio::test]
    async fn test_errors_propagate_from_pipeline() {
        let result = dashboard(Some(-14400)).handle_submit("Atlantis").await;
        assert!(matches!(result, Err(DashboardError::NotFound { .. })));

        let late = dashboard(Some(-14400))
            .with_clock(|| Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap());
        let result = late.handle_submit("Columbus").await;
        assert!(matches!(result, Err(DashboardError::NoMatch { .. })));
    }

    #[tokio::test]
    async fn test_single_submission_is_current() {
        let result = dashboard(Some(-14400)).submit("Columbus").await.unwrap();
        assert!(matches!(result, Submission::Current(_)));
    }

    #[tokio::test]
    async fn test_stale_submission_is_superseded() {
        let geocoder = Arc::new(GatedGeocoder {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let dashboard = Arc::new(
            Dashboard::new(geocoder.clone(), Arc::new(FakeForecast)).with_clock(fixed_now),
        );

        let slow = {
            let dashboard = Arc::clone(&dashboard);
            tokio::spawn(async move { dashboard.submit("slow").await })
        };
        geocoder.entered.notified().await;

        let fast = dashboard.submit("fast").await.unwrap();
        geocoder.release.notify_one();
        let slow = slow.await.unwrap().unwrap();

        match fast {
            Submission::Current(view) => assert_eq!(view.location.name, "fast"),
            Submission::Superseded => panic!("latest submission was discarded"),
        }
        assert!(matches!(slow, Submission::Superseded));
        assert!(dashboard.lock_latest().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_do_not_supersede_each_other() {
        let geocoder = Arc::new(GatedGeocoder {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let dashboard = Arc::new(
            Dashboard::new(geocoder.clone(), Arc::new(FakeForecast)).with_clock(fixed_now),
        );

        let slow = {
            let dashboard = Arc::clone(&dashboard);
            tokio::spawn(async move { dashboard.submit_in_session("tab-a", "slow").await })
        };
        geocoder.entered.notified().await;

        let other = dashboard.submit_in_session("tab-b", "fast").await.unwrap();
        geocoder.release.notify_one();
        let slow = slow.await.unwrap().unwrap();

        assert!(matches!(other, Submission::Current(_)));
        match slow {
            Submission::Current(view) => assert_eq!(view.location.name, "slow"),
            Submission::Superseded => panic!("other session's request discarded this one"),
        }
        assert!(dashboard.lock_latest().is_empty());
    }

    #[tokio::test]
    async fn test_session_is_reusable_after_completion() {
        let dashboard = dashboard(Some(-14400));
        for _ in 0..3 {
            let result = dashboard.submit_in_session("tab-a", "Columbus").await.unwrap();
            assert!(matches!(result, Submission::Current(_)));
        }
    }
}
