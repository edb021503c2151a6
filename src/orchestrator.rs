//! Query orchestration
//!
//! Ties the pieces together for one request: parse the free text,
//! geocode the destination, fan out to the data sources the intent
//! asks for, and compile whatever arrived into the final reply.
//! Geocoding always completes before any data-source call; the two
//! data-source paths are independent and degrade independently.

use crate::api::TravelDataSource;
use crate::breaker::{BreakerRegistry, Resource};
use crate::intent::{self, Intent};
use crate::invoker::invoke;
use crate::models::{Coordinates, QueryResult, WeatherSummary};
use crate::response::{self, compile_response};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::{info, warn};

/// Deadline for the weather path when both sources are queried,
/// measured from fan-out start
pub const WEATHER_DEADLINE: Duration = Duration::from_secs(15);

/// Deadline for the places path when both sources are queried,
/// measured from fan-out start
pub const PLACES_DEADLINE: Duration = Duration::from_secs(20);

/// Resilient coordinator for free-text travel queries.
///
/// Holds the shared data-source client and the process-wide breaker
/// registry; everything request-scoped stays on the stack of
/// [`answer_query`](Self::answer_query).
pub struct QueryOrchestrator {
    sources: Arc<dyn TravelDataSource>,
    breakers: Arc<BreakerRegistry>,
    attraction_limit: usize,
}

impl QueryOrchestrator {
    /// Create an orchestrator over a data source and breaker registry
    #[must_use]
    pub fn new(
        sources: Arc<dyn TravelDataSource>,
        breakers: Arc<BreakerRegistry>,
        attraction_limit: usize,
    ) -> Self {
        Self {
            sources,
            breakers,
            attraction_limit,
        }
    }

    /// Answer one free-text travel query.
    ///
    /// Returns the formatted multi-section reply, or one of the fixed
    /// user-facing strings when geocoding misses or every requested
    /// source degrades. Raw upstream errors never escape here.
    pub async fn answer_query(&self, user_text: &str, intent_override: Option<Intent>) -> String {
        let parsed = intent::parse_query(user_text);
        let intent = intent_override.unwrap_or(parsed.intent);
        info!(
            destination = %parsed.destination,
            intent = %intent,
            "answering travel query"
        );

        // Geocoding is a hard prerequisite: a transport error and an
        // empty result are equally "this place does not exist".
        let coords = match self.sources.geocode(&parsed.destination).await {
            Ok(Some(coords)) => coords,
            Ok(None) => {
                info!(destination = %parsed.destination, "destination not found");
                return response::PLACE_NOT_FOUND.to_string();
            }
            Err(error) => {
                warn!(error = %error, "geocoding failed");
                return response::PLACE_NOT_FOUND.to_string();
            }
        };

        let result = self.resolve(intent, coords, parsed.destination).await;
        compile_response(&result)
    }

    /// Run the data-source calls an intent asks for and aggregate
    /// whatever arrives
    pub async fn resolve(
        &self,
        intent: Intent,
        coords: Coordinates,
        destination: String,
    ) -> QueryResult {
        let mut result = QueryResult::empty(destination);

        match intent {
            Intent::Weather => {
                result.weather = self.weather_guarded(coords).await;
            }
            Intent::Places => {
                result.attractions = self.attractions_guarded(coords).await.unwrap_or_default();
            }
            Intent::Both => {
                let (weather, attractions) = self.fan_out(coords).await;
                result.weather = weather;
                result.attractions = attractions;
            }
        }

        result
    }

    /// Query both sources concurrently, observing each under its own
    /// deadline.
    ///
    /// A path that outlives its deadline merely loses its slot in this
    /// response; the spawned task is not aborted, runs to completion
    /// in the background, and its outcome still updates the shared
    /// breaker state.
    async fn fan_out(&self, coords: Coordinates) -> (Option<WeatherSummary>, Vec<String>) {
        let started = Instant::now();

        let weather_task = tokio::spawn({
            let sources = Arc::clone(&self.sources);
            let breakers = Arc::clone(&self.breakers);
            async move {
                invoke(breakers.breaker(Resource::Weather), || {
                    sources.fetch_weather(coords)
                })
                .await
            }
        });

        let places_task = tokio::spawn({
            let sources = Arc::clone(&self.sources);
            let breakers = Arc::clone(&self.breakers);
            let limit = self.attraction_limit;
            async move {
                invoke(breakers.breaker(Resource::Places), || {
                    sources.fetch_attractions(coords, limit)
                })
                .await
            }
        });

        let weather = match timeout_at(started + WEATHER_DEADLINE, weather_task).await {
            Ok(Ok(weather)) => weather,
            Ok(Err(join_error)) => {
                warn!(error = %join_error, "weather task failed");
                None
            }
            Err(_) => {
                warn!("weather path missed its deadline, dropping its result");
                None
            }
        };

        let attractions = match timeout_at(started + PLACES_DEADLINE, places_task).await {
            Ok(Ok(attractions)) => attractions.unwrap_or_default(),
            Ok(Err(join_error)) => {
                warn!(error = %join_error, "places task failed");
                Vec::new()
            }
            Err(_) => {
                warn!("places path missed its deadline, dropping its result");
                Vec::new()
            }
        };

        (weather, attractions)
    }

    async fn weather_guarded(&self, coords: Coordinates) -> Option<WeatherSummary> {
        invoke(self.breakers.breaker(Resource::Weather), || {
            self.sources.fetch_weather(coords)
        })
        .await
    }

    async fn attractions_guarded(&self, coords: Coordinates) -> Option<Vec<String>> {
        invoke(self.breakers.breaker(Resource::Places), || {
            self.sources.fetch_attractions(coords, self.attraction_limit)
        })
        .await
    }
}
