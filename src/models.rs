//! Data models for the TourGuide application
//!
//! Core domain types passed between the orchestrator and its
//! collaborators: geographic coordinates, weather summaries, and the
//! per-request aggregate handed to the response compiler.

use std::fmt;

/// Geographic coordinates produced by geocoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create new coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format coordinates for log output
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Current-conditions summary for a destination
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSummary {
    /// Temperature in whole degrees Celsius
    pub temperature_c: i32,
    /// Precipitation probability in percent for the current hourly
    /// slot, when the provider reported a matching slot
    pub precipitation_chance: Option<i32>,
}

impl WeatherSummary {
    #[must_use]
    pub fn new(temperature_c: i32, precipitation_chance: Option<i32>) -> Self {
        Self {
            temperature_c,
            precipitation_chance,
        }
    }
}

impl fmt::Display for WeatherSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chance = self
            .precipitation_chance
            .map_or_else(|| "N/A".to_string(), |p| format!("{p}%"));
        write!(
            f,
            "{}°C with a chance of {} to rain",
            self.temperature_c, chance
        )
    }
}

/// Aggregate of whatever the data sources delivered for one request.
///
/// Either section may be absent; an all-absent result is the caller's
/// signal that every requested source degraded.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Destination string the sections refer to
    pub destination: String,
    /// Current weather, absent when the source degraded
    pub weather: Option<WeatherSummary>,
    /// Distinct attraction names in upstream order, empty when the
    /// source degraded or was not requested
    pub attractions: Vec<String>,
}

impl QueryResult {
    /// Create an empty result for a destination
    #[must_use]
    pub fn empty(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            weather: None,
            attractions: Vec::new(),
        }
    }

    /// True when no section holds any data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weather.is_none() && self.attractions.is_empty()
    }
}
