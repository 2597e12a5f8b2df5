//! Weather API client for OpenMeteo integration
//!
//! This module provides HTTP client functionality for the OpenMeteo geocoding
//! and forecast endpoints. Transient failures are retried with exponential
//! backoff by middleware, and forecast responses are cached for a configurable
//! freshness window. The client is constructed explicitly and passed to the
//! services that need it.

use crate::cache::ResponseCache;
use crate::config::{ApiConfig, DashboardConfig, HttpConfig};
use crate::models::HourlyVariable;
use crate::models::openmeteo::{ForecastResponse, GeocodingResponse};
use crate::{DashboardError, Result};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{Jitter, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

const USER_AGENT: &str = concat!("WeatherDash/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the OpenMeteo APIs, owning its response cache and retry policy
#[derive(Clone)]
pub struct WeatherApiClient {
    client: ClientWithMiddleware,
    cache: Arc<ResponseCache>,
    cache_expiry: Duration,
    geocoding_base_url: String,
    forecast_base_url: String,
}

/// Exponential backoff starting at the configured delay, doubling per retry
fn retry_policy(http: &HttpConfig) -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .retry_bounds(http.retry_backoff(), http.retry_max_backoff())
        .jitter(Jitter::Bounded)
        .base(2)
        .build_with_max_retries(http.retry_attempts.saturating_sub(1))
}

impl WeatherApiClient {
    /// Create a new client from endpoint and HTTP policy settings
    pub fn new(api: &ApiConfig, http: &HttpConfig) -> Result<Self> {
        let timeout = Duration::from_secs(api.timeout_seconds.into());

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DashboardError::config(format!("Failed to create HTTP client: {e}")))?;

        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy(http)))
            .build();

        Ok(Self {
            client,
            cache: Arc::new(ResponseCache::new()),
            cache_expiry: http.cache_expiry(),
            geocoding_base_url: api.geocoding_base_url.trim_end_matches('/').to_string(),
            forecast_base_url: api.forecast_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::new(&config.api, &config.http)
    }

    /// Share a cache between clients
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Geocoding request URL asking for the single best match
    #[must_use]
    pub fn geocoding_url(&self, query: &str) -> String {
        format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.geocoding_base_url,
            urlencoding::encode(query)
        )
    }

    /// Forecast request URL; imperial units, location-local timezone, unix time axis
    #[must_use]
    pub fn forecast_url(
        &self,
        latitude: f64,
        longitude: f64,
        variables: &[HourlyVariable],
        days: u8,
    ) -> String {
        let hourly = variables
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/forecast?latitude={}&longitude={}&hourly={}&temperature_unit=fahrenheit&wind_speed_unit=mph&precipitation_unit=inch&timezone=auto&timeformat=unixtime&forecast_days={}",
            self.forecast_base_url, latitude, longitude, hourly, days
        )
    }

    /// Look up a place name. Not cached.
    #[instrument(skip(self))]
    pub async fn search_locations(&self, query: &str) -> Result<GeocodingResponse> {
        info!("Geocoding location: '{}'", query);
        let url = self.geocoding_url(query);
        let body = self.get_text(&url).await?;
        parse_json(&body, "geocoding")
    }

    /// Fetch the hourly forecast, serving a cached response while it is fresh
    #[instrument(skip(self, variables))]
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        variables: &[HourlyVariable],
        days: u8,
    ) -> Result<ForecastResponse> {
        let url = self.forecast_url(latitude, longitude, variables, days);

        match self.cache.get::<String>(&url) {
            Ok(Some(body)) => {
                debug!("Serving forecast from cache");
                return parse_json(&body, "forecast");
            }
            Ok(None) => {}
            Err(e) => warn!("Cache lookup failed, fetching fresh forecast: {}", e),
        }

        let body = self.get_text(&url).await?;
        let response: ForecastResponse = parse_json(&body, "forecast")?;

        if let Err(e) = self.cache.put(&url, &body, self.cache_expiry) {
            warn!("Failed to cache forecast response: {}", e);
        }

        Ok(response)
    }

    /// GET a URL and return the body of a successful response.
    /// Transient failures were already retried by the middleware.
    async fn get_text(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("OpenMeteo API request URL: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("API request failed with status {}", status);
            return Err(DashboardError::fetch(format!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body = response.text().await?;
        let total_duration = start_time.elapsed();
        debug!("API request completed in {:.3}s", total_duration.as_secs_f64());

        if total_duration.as_secs() > 5 {
            warn!("Slow API response detected: {:.3}s", total_duration.as_secs_f64());
        }

        Ok(body)
    }
}

fn parse_json<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| DashboardError::fetch(format!("Invalid {what} data received from OpenMeteo API: {e}")))
}
