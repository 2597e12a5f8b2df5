//! Location Resolution Module
//!
//! This module resolves free-text location input (city names, postal codes)
//! into structured Location objects via the OpenMeteo geocoding service.

use crate::models::Location;
use crate::models::openmeteo::GeocodingResult;
use crate::{DashboardError, Result, WeatherApiClient};
use async_trait::async_trait;
use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Anything that can turn a free-text query into a single location
#[async_trait]
pub trait LocationLookup: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Location>;
}

/// Geocoder backed by the OpenMeteo search endpoint
pub struct LocationResolver {
    api_client: WeatherApiClient,
}

impl LocationResolver {
    #[must_use]
    pub fn new(api_client: WeatherApiClient) -> Self {
        Self { api_client }
    }

    /// Resolve a location name or postal code to its best match
    pub async fn resolve_location(&self, query: &str) -> Result<Location> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DashboardError::validation("Location cannot be empty"));
        }

        debug!("Geocoding location name: {}", query);

        let response = self.api_client.search_locations(query).await?;
        let Some(geocoding) = response.results.unwrap_or_default().into_iter().next() else {
            warn!("No results found for location '{}'", query);
            return Err(DashboardError::not_found(query));
        };

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            geocoding.name, geocoding.latitude, geocoding.longitude
        );

        Ok(location_from_geocoding(geocoding, Utc::now()))
    }
}

#[async_trait]
impl LocationLookup for LocationResolver {
    async fn resolve(&self, query: &str) -> Result<Location> {
        self.resolve_location(query).await
    }
}

/// UTC offset in effect for an IANA timezone at `now`
#[must_use]
pub fn current_offset(timezone: &str, now: DateTime<Utc>) -> Option<i32> {
    let tz: Tz = timezone.parse().ok()?;
    Some(tz.offset_from_utc_datetime(&now.naive_utc()).fix().local_minus_utc())
}

fn location_from_geocoding(geocoding: GeocodingResult, now: DateTime<Utc>) -> Location {
    let utc_offset_seconds = geocoding
        .timezone
        .as_deref()
        .and_then(|tz| current_offset(tz, now));

    Location {
        name: geocoding.name,
        admin_region: geocoding.admin1.unwrap_or_default(),
        country: geocoding.country.unwrap_or_default(),
        latitude: geocoding.latitude,
        longitude: geocoding.longitude,
        utc_offset_seconds,
        timezone: geocoding.timezone,
    }
}
