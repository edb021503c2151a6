//! Upstream API clients for geocoding, weather, and attractions
//!
//! Thin I/O wrappers around the three third-party providers: Nominatim
//! for geocoding, Open-Meteo for current weather, and Overpass for
//! points of interest. Each call is a single attempt; retries, backoff
//! and circuit breaking live in the orchestrator layer above.

use crate::config::SourcesConfig;
use crate::models::{Coordinates, WeatherSummary};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// The external data boundary of the orchestrator.
///
/// Implementations are single-attempt: any transport error, non-2xx
/// status, or unexpected response shape surfaces as `Err` and the
/// caller decides how to degrade.
#[async_trait]
pub trait TravelDataSource: Send + Sync {
    /// Resolve a place name to coordinates. `Ok(None)` means the
    /// provider found nothing for the name.
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>>;

    /// Fetch a current-conditions summary for coordinates.
    async fn fetch_weather(&self, coords: Coordinates) -> Result<WeatherSummary>;

    /// Fetch up to `limit` distinct attraction names near coordinates,
    /// in upstream order.
    async fn fetch_attractions(&self, coords: Coordinates, limit: usize) -> Result<Vec<String>>;
}

/// [`TravelDataSource`] backed by the public Nominatim, Open-Meteo and
/// Overpass HTTP APIs
pub struct HttpDataSource {
    /// Shared HTTP client
    client: Client,
    /// Endpoint and timeout settings
    sources: SourcesConfig,
    /// Attraction search radius in meters
    search_radius_m: u32,
}

impl HttpDataSource {
    /// Create a new client over the configured endpoints
    pub fn new(sources: SourcesConfig, search_radius_km: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(sources.user_agent.clone())
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            sources,
            search_radius_m: search_radius_km * 1_000,
        })
    }
}

#[async_trait]
impl TravelDataSource for HttpDataSource {
    #[instrument(skip(self))]
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>> {
        let url = format!(
            "{}?q={}&format=json&limit=1",
            self.sources.geocoding_url,
            urlencoding::encode(place)
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(
                self.sources.geocode_timeout_seconds.into(),
            ))
            .send()
            .await?
            .error_for_status()?;

        let results: Vec<nominatim::SearchResult> = response
            .json()
            .await
            .with_context(|| "Failed to parse Nominatim response")?;

        let Some(first) = results.first() else {
            debug!(place, "no geocoding results");
            return Ok(None);
        };

        let latitude: f64 = first
            .lat
            .parse()
            .with_context(|| "Nominatim returned a non-numeric latitude")?;
        let longitude: f64 = first
            .lon
            .parse()
            .with_context(|| "Nominatim returned a non-numeric longitude")?;

        let coords = Coordinates::new(latitude, longitude);
        debug!(place, coords = %coords.format_coordinates(), "geocoded");
        Ok(Some(coords))
    }

    #[instrument(skip(self), fields(coords = %coords.format_coordinates()))]
    async fn fetch_weather(&self, coords: Coordinates) -> Result<WeatherSummary> {
        let url = format!(
            "{}?latitude={}&longitude={}&current=temperature_2m&hourly=precipitation_probability&forecast_days=1&timezone=auto",
            self.sources.weather_url, coords.latitude, coords.longitude
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(
                self.sources.weather_timeout_seconds.into(),
            ))
            .send()
            .await?
            .error_for_status()?;

        let forecast: openmeteo::ForecastResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse Open-Meteo forecast response")?;

        let current = forecast
            .current
            .ok_or_else(|| anyhow!("Open-Meteo response missing current conditions"))?;
        let temperature = current
            .temperature_2m
            .ok_or_else(|| anyhow!("Open-Meteo response missing current temperature"))?;

        let precipitation_chance =
            precipitation_for_current_slot(current.time.as_deref(), forecast.hourly.as_ref());
        if precipitation_chance.is_none() {
            debug!("no hourly slot matches the current time, probability unavailable");
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(WeatherSummary::new(
            temperature.round() as i32,
            precipitation_chance,
        ))
    }

    #[instrument(skip(self), fields(coords = %coords.format_coordinates()))]
    async fn fetch_attractions(&self, coords: Coordinates, limit: usize) -> Result<Vec<String>> {
        let query = format!(
            "[out:json][timeout:25];\n\
             node(around:{},{},{})[\"tourism\"=\"attraction\"];\n\
             out tags;",
            self.search_radius_m, coords.latitude, coords.longitude
        );

        let response = self
            .client
            .post(&self.sources.attractions_url)
            .form(&[("data", query.as_str())])
            .timeout(Duration::from_secs(
                self.sources.attractions_timeout_seconds.into(),
            ))
            .send()
            .await?
            .error_for_status()?;

        let body: overpass::QueryResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse Overpass response")?;

        let names = distinct_names(body.elements, limit);
        if names.is_empty() {
            warn!("no named attractions within radius");
        }
        Ok(names)
    }
}

/// Probability from the hourly slot whose time string equals the
/// provider's current-time string. Any mismatch (absent arrays, length
/// skew, no exact match) degrades to `None` rather than guessing a
/// nearby slot.
#[allow(clippy::cast_possible_truncation)]
fn precipitation_for_current_slot(
    current_time: Option<&str>,
    hourly: Option<&openmeteo::HourlyData>,
) -> Option<i32> {
    let current_time = current_time?;
    let hourly = hourly?;
    let times = hourly.time.as_ref()?;
    let probabilities = hourly.precipitation_probability.as_ref()?;
    if times.len() != probabilities.len() {
        return None;
    }

    let index = times.iter().position(|slot| slot == current_time)?;
    probabilities
        .get(index)
        .copied()
        .flatten()
        .map(|p| p.round() as i32)
}

/// Deduplicate element names preserving upstream order, up to `limit`
fn distinct_names(elements: Vec<overpass::Element>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for element in elements {
        let Some(name) = element.tags.and_then(|tags| tags.name) else {
            continue;
        };
        if seen.insert(name.clone()) {
            names.push(name);
        }
        if names.len() >= limit {
            break;
        }
    }
    names
}

/// Nominatim search response structures
mod nominatim {
    use serde::Deserialize;

    /// One geocoding hit; Nominatim serializes coordinates as strings
    #[derive(Debug, Deserialize)]
    pub struct SearchResult {
        pub lat: String,
        pub lon: String,
    }
}

/// Open-Meteo forecast response structures
mod openmeteo {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub current: Option<CurrentData>,
        pub hourly: Option<HourlyData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        pub temperature_2m: Option<f64>,
        /// Local-time string of the current observation, matching the
        /// format of the hourly slot times
        pub time: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct HourlyData {
        pub time: Option<Vec<String>>,
        pub precipitation_probability: Option<Vec<Option<f64>>>,
    }
}

/// Overpass QL response structures
mod overpass {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct QueryResponse {
        #[serde(default)]
        pub elements: Vec<Element>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Element {
        pub tags: Option<Tags>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Tags {
        pub name: Option<String>,
    }
}
