//! Per-resource circuit breakers
//!
//! Each external data source gets one process-wide breaker tracking a
//! consecutive-failure count and an open-until deadline. Three
//! consecutive failures open the breaker for thirty seconds; the first
//! call after the deadline passes is let through as an implicit probe
//! and its outcome decides whether the breaker re-opens. There is no
//! explicit half-open state.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Consecutive failures that open a breaker
pub const FAILURE_THRESHOLD: u32 = 3;

/// Seconds a breaker stays open once armed
pub const COOL_DOWN_SECS: u64 = 30;

/// External resources guarded by a breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Weather provider
    Weather,
    /// Attractions provider
    Places,
}

impl Resource {
    /// Stable name used in logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Weather => "weather",
            Resource::Places => "places",
        }
    }
}

/// Mutable breaker bookkeeping for one resource
#[derive(Debug, Default, Clone, Copy)]
struct BreakerState {
    /// Failures since the last success
    consecutive_failures: u32,
    /// Epoch seconds until which attempts are short-circuited;
    /// zero or any past value means closed
    open_until: u64,
}

/// Failure-counter circuit breaker for one named resource.
///
/// Shared across concurrent requests; every check and transition takes
/// the internal lock so a read-check-then-write never races.
#[derive(Debug)]
pub struct CircuitBreaker {
    resource: Resource,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker for a resource
    #[must_use]
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// The resource this breaker guards
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Whether an attempt may proceed right now
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(unix_now())
    }

    /// Clock-explicit variant of [`try_acquire`](Self::try_acquire)
    #[must_use]
    pub fn try_acquire_at(&self, now: u64) -> bool {
        let state = self.state.lock().unwrap();
        if state.open_until > now {
            debug!(
                resource = self.resource.as_str(),
                open_for = state.open_until - now,
                "breaker open, short-circuiting attempt"
            );
            false
        } else {
            true
        }
    }

    /// Record a successful attempt; fully closes the breaker
    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap();
        if state.consecutive_failures > 0 || state.open_until > 0 {
            debug!(
                resource = self.resource.as_str(),
                "breaker reset after success"
            );
        }
        state.consecutive_failures = 0;
        state.open_until = 0;
    }

    /// Record a failed attempt; may (re-)arm the open window
    pub fn record_failure(&self) {
        self.record_failure_at(unix_now());
    }

    /// Clock-explicit variant of [`record_failure`](Self::record_failure)
    pub fn record_failure_at(&self, now: u64) {
        let mut state = self.state.lock().unwrap();
        state.consecutive_failures += 1;
        if state.consecutive_failures >= FAILURE_THRESHOLD {
            // Re-armed on every failure at or past the threshold, so a
            // failed probe extends the blocked window.
            state.open_until = now + COOL_DOWN_SECS;
            warn!(
                resource = self.resource.as_str(),
                failures = state.consecutive_failures,
                cool_down_secs = COOL_DOWN_SECS,
                "breaker opened"
            );
        }
    }

    /// Failures since the last success
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.state.lock().unwrap().consecutive_failures
    }
}

/// The process-wide set of breakers, one per resource.
///
/// Constructed once at startup and handed to the orchestrator by
/// `Arc`; nothing else mutates breaker state.
#[derive(Debug)]
pub struct BreakerRegistry {
    weather: CircuitBreaker,
    places: CircuitBreaker,
}

impl Default for BreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakerRegistry {
    /// Create a registry with all breakers closed
    #[must_use]
    pub fn new() -> Self {
        Self {
            weather: CircuitBreaker::new(Resource::Weather),
            places: CircuitBreaker::new(Resource::Places),
        }
    }

    /// The breaker guarding a resource
    #[must_use]
    pub fn breaker(&self, resource: Resource) -> &CircuitBreaker {
        match resource {
            Resource::Weather => &self.weather,
            Resource::Places => &self.places,
        }
    }
}

/// Current time as Unix epoch seconds
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
