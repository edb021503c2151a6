//! End-to-end tests for the query orchestrator over a scripted data
//! source: intent routing, graceful degradation, fan-out deadlines,
//! and circuit-breaker behavior across calls.

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tourguide::breaker::{BreakerRegistry, Resource};
use tourguide::models::{Coordinates, WeatherSummary};
use tourguide::orchestrator::QueryOrchestrator;
use tourguide::response;
use tourguide::{Intent, TravelDataSource};

/// How a scripted endpoint behaves on every call
#[derive(Clone, Copy)]
enum Script {
    Succeed,
    Fail,
    HangThenSucceed(Duration),
    HangThenFail(Duration),
}

struct ScriptedSource {
    geocode_hit: bool,
    geocode_error: bool,
    weather: Script,
    places: Script,
    weather_calls: AtomicU32,
    places_calls: AtomicU32,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            geocode_hit: true,
            geocode_error: false,
            weather: Script::Succeed,
            places: Script::Succeed,
            weather_calls: AtomicU32::new(0),
            places_calls: AtomicU32::new(0),
        }
    }

    fn weather_calls(&self) -> u32 {
        self.weather_calls.load(Ordering::SeqCst)
    }

    fn places_calls(&self) -> u32 {
        self.places_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TravelDataSource for ScriptedSource {
    async fn geocode(&self, _place: &str) -> Result<Option<Coordinates>> {
        if self.geocode_error {
            bail!("nominatim unreachable");
        }
        Ok(self.geocode_hit.then(|| Coordinates::new(48.8566, 2.3522)))
    }

    async fn fetch_weather(&self, _coords: Coordinates) -> Result<WeatherSummary> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);
        match self.weather {
            Script::Succeed => Ok(WeatherSummary::new(18, Some(40))),
            Script::Fail => bail!("weather api down"),
            Script::HangThenSucceed(delay) => {
                sleep(delay).await;
                Ok(WeatherSummary::new(18, Some(40)))
            }
            Script::HangThenFail(delay) => {
                sleep(delay).await;
                bail!("weather api down")
            }
        }
    }

    async fn fetch_attractions(&self, _coords: Coordinates, limit: usize) -> Result<Vec<String>> {
        self.places_calls.fetch_add(1, Ordering::SeqCst);
        let all = ["Eiffel Tower", "Louvre"];
        match self.places {
            Script::Succeed => Ok(all.iter().take(limit).map(ToString::to_string).collect()),
            Script::Fail => bail!("overpass api down"),
            Script::HangThenSucceed(delay) => {
                sleep(delay).await;
                Ok(all.iter().take(limit).map(ToString::to_string).collect())
            }
            Script::HangThenFail(delay) => {
                sleep(delay).await;
                bail!("overpass api down")
            }
        }
    }
}

fn orchestrator_over(
    source: ScriptedSource,
) -> (QueryOrchestrator, Arc<ScriptedSource>, Arc<BreakerRegistry>) {
    let source = Arc::new(source);
    let breakers = Arc::new(BreakerRegistry::new());
    let orchestrator = QueryOrchestrator::new(
        Arc::clone(&source) as Arc<dyn TravelDataSource>,
        Arc::clone(&breakers),
        5,
    );
    (orchestrator, source, breakers)
}

#[tokio::test]
async fn weather_intent_queries_only_the_weather_source() {
    let (orchestrator, source, _) = orchestrator_over(ScriptedSource::new());

    let reply = orchestrator.answer_query("Weather in Paris", None).await;

    assert_eq!(reply, "Weather in paris: 18°C with a chance of 40% to rain.");
    assert_eq!(source.weather_calls(), 1);
    assert_eq!(source.places_calls(), 0);
}

#[tokio::test]
async fn places_intent_queries_only_the_places_source() {
    let (orchestrator, source, _) = orchestrator_over(ScriptedSource::new());

    let reply = orchestrator
        .answer_query("top attractions in Paris", None)
        .await;

    assert_eq!(reply, "Top attractions near paris:\n- Eiffel Tower\n- Louvre");
    assert_eq!(source.weather_calls(), 0);
    assert_eq!(source.places_calls(), 1);
}

#[tokio::test]
async fn ambiguous_query_fans_out_to_both_sources() {
    let (orchestrator, source, _) = orchestrator_over(ScriptedSource::new());

    let reply = orchestrator.answer_query("I'm going to Paris!", None).await;

    assert_eq!(
        reply,
        "Weather in paris: 18°C with a chance of 40% to rain.\n\n\
         Top attractions near paris:\n- Eiffel Tower\n- Louvre"
    );
    assert_eq!(source.weather_calls(), 1);
    assert_eq!(source.places_calls(), 1);
}

#[tokio::test]
async fn intent_override_wins_over_classification() {
    let (orchestrator, source, _) = orchestrator_over(ScriptedSource::new());

    let reply = orchestrator
        .answer_query("Weather in Paris", Some(Intent::Places))
        .await;

    assert_eq!(reply, "Top attractions near paris:\n- Eiffel Tower\n- Louvre");
    assert_eq!(source.weather_calls(), 0);
    assert_eq!(source.places_calls(), 1);
}

#[tokio::test]
async fn unknown_place_yields_fixed_not_found_reply() {
    let mut source = ScriptedSource::new();
    source.geocode_hit = false;
    let (orchestrator, source, _) = orchestrator_over(source);

    let reply = orchestrator.answer_query("visit Atlantis", None).await;

    assert_eq!(reply, response::PLACE_NOT_FOUND);
    // No fan-out without coordinates
    assert_eq!(source.weather_calls(), 0);
    assert_eq!(source.places_calls(), 0);
}

#[tokio::test]
async fn geocoding_error_reads_the_same_as_no_match() {
    let mut source = ScriptedSource::new();
    source.geocode_error = true;
    let (orchestrator, _, _) = orchestrator_over(source);

    let reply = orchestrator.answer_query("visit Paris", None).await;

    assert_eq!(reply, response::PLACE_NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn one_failing_source_degrades_to_the_other_section() {
    let mut source = ScriptedSource::new();
    source.weather = Script::Fail;
    let (orchestrator, source, _) = orchestrator_over(source);

    let reply = orchestrator.answer_query("I'm going to Paris", None).await;

    assert_eq!(reply, "Top attractions near paris:\n- Eiffel Tower\n- Louvre");
    // Exhausted its three attempts before degrading
    assert_eq!(source.weather_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn all_sources_failing_yields_fixed_apology() {
    let mut source = ScriptedSource::new();
    source.weather = Script::Fail;
    source.places = Script::Fail;
    let (orchestrator, _, _) = orchestrator_over(source);

    let reply = orchestrator.answer_query("I'm going to Paris", None).await;

    assert_eq!(reply, response::SOURCES_UNAVAILABLE);
}

#[tokio::test(start_paused = true)]
async fn slow_weather_path_misses_deadline_but_places_still_answer() {
    let mut source = ScriptedSource::new();
    source.weather = Script::HangThenSucceed(Duration::from_secs(16));
    let (orchestrator, _, _) = orchestrator_over(source);

    let reply = orchestrator.answer_query("I'm going to Paris", None).await;

    assert_eq!(reply, "Top attractions near paris:\n- Eiffel Tower\n- Louvre");
}

#[tokio::test(start_paused = true)]
async fn slow_places_path_misses_deadline_but_weather_still_answers() {
    let mut source = ScriptedSource::new();
    source.places = Script::HangThenSucceed(Duration::from_secs(21));
    let (orchestrator, _, _) = orchestrator_over(source);

    let reply = orchestrator.answer_query("I'm going to Paris", None).await;

    assert_eq!(reply, "Weather in paris: 18°C with a chance of 40% to rain.");
}

#[tokio::test(start_paused = true)]
async fn late_failure_still_counts_toward_the_breaker() {
    let mut source = ScriptedSource::new();
    source.weather = Script::HangThenFail(Duration::from_secs(16));
    let (orchestrator, source, breakers) = orchestrator_over(source);

    let reply = orchestrator.answer_query("I'm going to Paris", None).await;
    assert_eq!(reply, "Top attractions near paris:\n- Eiffel Tower\n- Louvre");

    // The orphaned weather task keeps retrying in the background and
    // its failures must still reach the shared breaker.
    sleep(Duration::from_secs(120)).await;
    assert_eq!(source.weather_calls(), 3);
    assert_eq!(breakers.breaker(Resource::Weather).consecutive_failures(), 3);
}

#[tokio::test]
async fn open_breaker_short_circuits_without_an_attempt() {
    let (orchestrator, source, breakers) = orchestrator_over(ScriptedSource::new());
    for _ in 0..3 {
        breakers.breaker(Resource::Weather).record_failure();
    }

    let reply = orchestrator.answer_query("Weather in Paris", None).await;

    assert_eq!(reply, response::SOURCES_UNAVAILABLE);
    assert_eq!(source.weather_calls(), 0);
}

#[tokio::test]
async fn breakers_are_independent_per_resource() {
    let (orchestrator, source, breakers) = orchestrator_over(ScriptedSource::new());
    for _ in 0..3 {
        breakers.breaker(Resource::Weather).record_failure();
    }

    let reply = orchestrator.answer_query("I'm going to Paris", None).await;

    // Weather short-circuits, places is unaffected
    assert_eq!(reply, "Top attractions near paris:\n- Eiffel Tower\n- Louvre");
    assert_eq!(source.weather_calls(), 0);
    assert_eq!(source.places_calls(), 1);
}

#[tokio::test]
async fn success_closes_a_recovering_breaker() {
    let (orchestrator, _, breakers) = orchestrator_over(ScriptedSource::new());
    let weather_breaker = breakers.breaker(Resource::Weather);
    weather_breaker.record_failure();
    weather_breaker.record_failure();

    let reply = orchestrator.answer_query("Weather in Paris", None).await;

    assert_eq!(reply, "Weather in paris: 18°C with a chance of 40% to rain.");
    assert_eq!(weather_breaker.consecutive_failures(), 0);
}
