//! Location model for geographic coordinates and metadata

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// A geocoded place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Place name (city, town, postal area)
    pub name: String,
    /// First-level administrative region (state, province)
    pub admin_region: String,
    /// Country name
    pub country: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Offset from UTC in seconds, when known
    pub utc_offset_seconds: Option<i32>,
    /// IANA timezone name reported by the geocoder
    pub timezone: Option<String>,
}

impl Location {
    /// Create a new location without naming metadata
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            name,
            admin_region: String::new(),
            country: String::new(),
            latitude,
            longitude,
            utc_offset_seconds: None,
            timezone: None,
        }
    }

    /// Fill in the UTC offset if the geocoder could not provide one
    #[must_use]
    pub fn with_fallback_offset(mut self, utc_offset_seconds: i32) -> Self {
        if self.utc_offset_seconds.is_none() {
            self.utc_offset_seconds = Some(utc_offset_seconds);
        }
        self
    }

    /// The UTC offset as a chrono offset, if known and in range
    #[must_use]
    pub fn fixed_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_seconds.and_then(FixedOffset::east_opt)
    }

    /// "Name, Region, Country", skipping empty parts
    #[must_use]
    pub fn display_name(&self) -> String {
        [&self.name, &self.admin_region, &self.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{}°, {}°", self.latitude, self.longitude)
    }
}
