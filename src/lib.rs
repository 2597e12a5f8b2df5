//! `WeatherDash` - current conditions and today's wind for any place name
//!
//! This library geocodes a free-text location, fetches today's hourly
//! forecast from Open-Meteo, picks the row for the location's current local
//! hour and turns it into a view model for the web dashboard.

pub mod api;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod local_time;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod weather;
pub mod web;
pub mod wind;

#[cfg(test)]
mod testing;

// Re-export core types for public API
pub use api::WeatherApiClient;
pub use cache::ResponseCache;
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardViewModel, Submission};
pub use error::DashboardError;
pub use location_resolver::{LocationLookup, LocationResolver};
pub use models::{ForecastSeries, HourlyRecord, HourlyVariable, Location};
pub use weather::{ForecastService, ForecastSource};
pub use wind::{ArrowVector, CompassDirection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DashboardError>;
