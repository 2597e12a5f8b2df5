//! Data models for the WeatherDash application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates, naming and UTC offset
//! - Forecast: Hourly records and the validated series they form
//! - Openmeteo: Wire-level response structures of the upstream API

pub mod forecast;
pub mod location;
pub mod openmeteo;

// Re-export all public types for convenient access
pub use forecast::{ForecastSeries, HourlyRecord, HourlyVariable};
pub use location::Location;
