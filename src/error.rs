//! Error types and handling for the `WeatherDash` application

use thiserror::Error;

/// Main error type for the `WeatherDash` application
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Geocoding returned no match for the query
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// Forecast retrieval failed or returned malformed data
    #[error("Forecast fetch failed: {message}")]
    Fetch { message: String },

    /// The location's UTC offset is unknown or unusable
    #[error("Cannot resolve local time: {message}")]
    TimeResolution { message: String },

    /// No unique forecast row for the current local hour
    #[error("No forecast row for the current hour: {message}")]
    NoMatch { message: String },

    /// Bearing outside [0, 360]
    #[error("Invalid degree input {degrees}: degrees must be between 0 and 360")]
    InvalidDegree { degrees: f64 },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DashboardError {
    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create a new fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a new time resolution error
    pub fn time_resolution<S: Into<String>>(message: S) -> Self {
        Self::TimeResolution {
            message: message.into(),
        }
    }

    /// Create a new row selection error
    pub fn no_match<S: Into<String>>(message: S) -> Self {
        Self::NoMatch {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Stable machine-readable name of the error kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::NotFound { .. } => "not_found",
            DashboardError::Fetch { .. } => "fetch",
            DashboardError::TimeResolution { .. } => "time_resolution",
            DashboardError::NoMatch { .. } => "no_match",
            DashboardError::InvalidDegree { .. } => "invalid_degree",
            DashboardError::Validation { .. } => "validation",
            DashboardError::Config { .. } => "config",
            DashboardError::Io { .. } => "io",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::NotFound { query } => {
                format!("No location matches \"{query}\". Try a city name or ZIP code.")
            }
            DashboardError::Fetch { .. } => {
                "Unable to retrieve the forecast right now. Please try again shortly.".to_string()
            }
            DashboardError::TimeResolution { .. } => {
                "The local time for this location could not be determined.".to_string()
            }
            DashboardError::NoMatch { .. } => {
                "The forecast does not cover the current hour for this location.".to_string()
            }
            DashboardError::InvalidDegree { .. } => {
                "Received an invalid wind direction from the forecast.".to_string()
            }
            DashboardError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            DashboardError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            DashboardError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest_middleware::Error> for DashboardError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::fetch(format!("request failed: {err}"))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::fetch(format!("request failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let not_found = DashboardError::not_found("Atlantis");
        assert!(matches!(not_found, DashboardError::NotFound { .. }));

        let fetch_err = DashboardError::fetch("connection failed");
        assert!(matches!(fetch_err, DashboardError::Fetch { .. }));

        let validation_err = DashboardError::validation("empty query");
        assert!(matches!(validation_err, DashboardError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let not_found = DashboardError::not_found("Atlantis");
        assert!(not_found.user_message().contains("Atlantis"));

        let fetch_err = DashboardError::fetch("test");
        assert!(fetch_err.user_message().contains("Unable to retrieve"));

        let validation_err = DashboardError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(DashboardError::no_match("x").kind(), "no_match");
        assert_eq!(DashboardError::time_resolution("x").kind(), "time_resolution");
        assert_eq!(
            DashboardError::InvalidDegree { degrees: 400.0 }.kind(),
            "invalid_degree"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let dash_err: DashboardError = io_err.into();
        assert!(matches!(dash_err, DashboardError::Io { .. }));
    }
}
