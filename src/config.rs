//! Configuration management for the TourGuide application
//!
//! Handles loading configuration from files and environment variables
//! and provides validation for all configuration settings. Retry
//! counts, backoff, breaker thresholds and fan-out deadlines are fixed
//! constants in their modules, not configuration.

use crate::TourGuideError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the TourGuide application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TourGuideConfig {
    /// External data source configuration
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default application settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// External data source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// User-Agent sent to every upstream provider (Nominatim requires
    /// an identifying one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Base URL for the Nominatim geocoding API
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Base URL for the Open-Meteo forecast API
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    /// URL of the Overpass API interpreter
    #[serde(default = "default_attractions_url")]
    pub attractions_url: String,
    /// Geocoding request timeout in seconds
    #[serde(default = "default_geocode_timeout")]
    pub geocode_timeout_seconds: u32,
    /// Weather request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub weather_timeout_seconds: u32,
    /// Attractions request timeout in seconds
    #[serde(default = "default_attractions_timeout")]
    pub attractions_timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum number of attractions to return
    #[serde(default = "default_attraction_limit")]
    pub attraction_limit: usize,
    /// Attraction search radius in kilometers
    #[serde(default = "default_search_radius")]
    pub search_radius_km: u32,
}

// Default value functions
fn default_user_agent() -> String {
    format!("tourguide/{}", env!("CARGO_PKG_VERSION"))
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_attractions_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_geocode_timeout() -> u32 {
    10
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_attractions_timeout() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_attraction_limit() -> usize {
    5
}

fn default_search_radius() -> u32 {
    20
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            geocoding_url: default_geocoding_url(),
            weather_url: default_weather_url(),
            attractions_url: default_attractions_url(),
            geocode_timeout_seconds: default_geocode_timeout(),
            weather_timeout_seconds: default_weather_timeout(),
            attractions_timeout_seconds: default_attractions_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            attraction_limit: default_attraction_limit(),
            search_radius_km: default_search_radius(),
        }
    }
}

impl TourGuideConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

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

        // Environment overrides with TOURGUIDE_ prefix, e.g.
        // TOURGUIDE_SOURCES__USER_AGENT
        builder = builder.add_source(
            Environment::with_prefix("TOURGUIDE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TourGuideConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tourguide").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.sources.user_agent.is_empty() {
            return Err(TourGuideError::config(
                "User agent cannot be empty; upstream providers require one",
            )
            .into());
        }

        for (name, timeout) in [
            ("Geocoding", self.sources.geocode_timeout_seconds),
            ("Weather", self.sources.weather_timeout_seconds),
            ("Attractions", self.sources.attractions_timeout_seconds),
        ] {
            if timeout == 0 {
                return Err(
                    TourGuideError::config(format!("{name} timeout cannot be zero")).into(),
                );
            }
            if timeout > 300 {
                return Err(TourGuideError::config(format!(
                    "{name} timeout cannot exceed 300 seconds"
                ))
                .into());
            }
        }

        if self.defaults.attraction_limit == 0 || self.defaults.attraction_limit > 50 {
            return Err(TourGuideError::config(
                "Attraction limit must be between 1 and 50",
            )
            .into());
        }

        if self.defaults.search_radius_km == 0 || self.defaults.search_radius_km > 500 {
            return Err(TourGuideError::config(
                "Search radius must be between 1 and 500 km",
            )
            .into());
        }

        Ok(())
    }
}
