//! `TourGuide` - resilient travel query assistant
//!
//! This library answers free-text travel queries by resolving a place
//! name to coordinates and fetching live weather and attractions from
//! independent third-party services, degrading gracefully when any of
//! them misbehaves.

pub mod api;
pub mod breaker;
pub mod config;
pub mod error;
pub mod intent;
pub mod invoker;
pub mod models;
pub mod orchestrator;
pub mod response;

// Re-export core types for public API
pub use api::{HttpDataSource, TravelDataSource};
pub use breaker::{BreakerRegistry, CircuitBreaker, Resource};
pub use config::TourGuideConfig;
pub use error::TourGuideError;
pub use intent::{Intent, ParsedQuery, parse_query};
pub use models::{Coordinates, QueryResult, WeatherSummary};
pub use orchestrator::QueryOrchestrator;
pub use response::compile_response;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TourGuideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
