//! Configuration management for `WeatherDash` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::DashboardError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `WeatherDash` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Upstream API endpoints
    pub api: ApiConfig,
    /// Response cache and retry policy
    pub http: HttpConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Web adapter settings
    pub server: ServerConfig,
}

/// Open-Meteo endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the geocoding API (the `/search` path is appended)
    pub geocoding_base_url: String,
    /// Base URL of the forecast API (the `/forecast` path is appended)
    pub forecast_base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Outbound HTTP behaviour: cache freshness and retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// How long a cached response stays fresh
    pub cache_expiry_seconds: u64,
    /// Total attempts per request, including the first one
    pub retry_attempts: u32,
    /// Delay before the first retry; doubles on every further retry
    pub retry_backoff_seconds: f64,
    /// Upper bound for a single backoff delay
    pub retry_max_backoff_seconds: f64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Web adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the presentation layer's static assets
    pub static_dir: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: default_geocoding_base_url(),
            forecast_base_url: default_forecast_base_url(),
            timeout_seconds: 30,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cache_expiry_seconds: 3600,
            retry_attempts: 5,
            retry_backoff_seconds: 0.2,
            retry_max_backoff_seconds: 30.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            static_dir: "frontend/dist".to_string(),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_seconds)
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff_seconds)
    }

    /// Never shorter than the initial backoff
    #[must_use]
    pub fn retry_max_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_max_backoff_seconds.max(self.retry_backoff_seconds))
    }
}

impl DashboardConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("WEATHERDASH_CONFIG").map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHERDASH_HTTP__RETRY_ATTEMPTS=3 -> http.retry_attempts
        builder = builder.add_source(
            Environment::with_prefix("WEATHERDASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: DashboardConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherdash").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.api.timeout_seconds == 0 || self.api.timeout_seconds > 300 {
            return Err(DashboardError::config(
                "API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.http.retry_attempts == 0 || self.http.retry_attempts > 10 {
            return Err(DashboardError::config(
                "Retry attempts must be between 1 and 10",
            )
            .into());
        }

        if !self.http.retry_backoff_seconds.is_finite()
            || self.http.retry_backoff_seconds < 0.0
            || self.http.retry_backoff_seconds > 60.0
        {
            return Err(DashboardError::config(
                "Retry backoff must be between 0 and 60 seconds",
            )
            .into());
        }

        if !self.http.retry_max_backoff_seconds.is_finite()
            || self.http.retry_max_backoff_seconds < 0.0
            || self.http.retry_max_backoff_seconds > 600.0
        {
            return Err(DashboardError::config(
                "Maximum retry backoff must be between 0 and 600 seconds",
            )
            .into());
        }

        if self.http.cache_expiry_seconds > 7 * 24 * 3600 {
            return Err(DashboardError::config(
                "Cache expiry cannot exceed 168 hours (1 week)",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DashboardError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DashboardError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [&self.api.geocoding_base_url, &self.api.forecast_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DashboardError::config(format!(
                    "API base URL must be a valid HTTP or HTTPS URL, got '{url}'"
                ))
                .into());
            }
        }

        Ok(())
    }
}
