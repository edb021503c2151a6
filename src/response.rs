//! Response compilation
//!
//! Pure assembly of the final user-facing text from a
//! [`QueryResult`], plus the fixed strings used when no data could be
//! produced at all.

use crate::models::QueryResult;

/// Reply when geocoding found nothing for the destination
pub const PLACE_NOT_FOUND: &str = "I don't think this place exists.";

/// Reply when every requested data source degraded
pub const SOURCES_UNAVAILABLE: &str = "Sorry, I couldn't retrieve weather or places right now.";

/// Prompt shown for blank input
pub const EMPTY_QUERY_PROMPT: &str = "Please enter a destination or travel query.";

/// Assemble the final response text.
///
/// Sections appear in fixed order (weather, then attractions)
/// regardless of which source answered first, separated by a blank
/// line. An all-absent result yields the fixed apology.
#[must_use]
pub fn compile_response(result: &QueryResult) -> String {
    let mut sections = Vec::new();

    if let Some(weather) = &result.weather {
        sections.push(format!("Weather in {}: {}.", result.destination, weather));
    }

    if !result.attractions.is_empty() {
        let listing = result
            .attractions
            .iter()
            .map(|name| format!("- {name}"))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!(
            "Top attractions near {}:\n{}",
            result.destination, listing
        ));
    }

    if sections.is_empty() {
        SOURCES_UNAVAILABLE.to_string()
    } else {
        sections.join("\n\n")
    }
}
