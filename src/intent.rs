//! Free-text query parsing
//!
//! Pure keyword/pattern heuristics that turn a user's travel query
//! into an intent category and a destination string. No I/O and no
//! failure cases: unclassifiable input degrades to [`Intent::Both`]
//! and to the cleaned raw text as destination.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Which data sources a query asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Weather only
    Weather,
    /// Attractions only
    Places,
    /// Both sources (also the fallback for ambiguous input)
    Both,
}

impl Intent {
    /// Stable name used in logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Weather => "weather",
            Intent::Places => "places",
            Intent::Both => "both",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weather" => Ok(Intent::Weather),
            "places" => Ok(Intent::Places),
            "both" => Ok(Intent::Both),
            other => Err(format!(
                "unknown intent '{other}' (expected weather, places, or both)"
            )),
        }
    }
}

/// Outcome of parsing one free-text query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Normalized destination string (may be empty or nonsensical;
    /// geocoding failure downstream is the only validity signal)
    pub destination: String,
    /// Classified intent
    pub intent: Intent,
}

/// Signal words for a weather request
const WEATHER_KEYWORDS: [&str; 5] = ["weather", "forecast", "temperature", "rain", "umbrella"];

/// Signal words for an attractions request
const PLACES_KEYWORDS: [&str; 6] = [
    "places",
    "attractions",
    "sights",
    "things to do",
    "poi",
    "tourist",
];

// Ordered: the multi-word phrases must run before the bare "in"/"at"/
// "to" forms they contain, which would otherwise match first and
// shadow the intended destination.
static DESTINATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"going to\s+([a-z\-\s]+)",
        r"go to\s+([a-z\-\s]+)",
        r"travel to\s+([a-z\-\s]+)",
        r"visit\s+([a-z\-\s]+)",
        r"in\s+([a-z\-\s]+)",
        r"at\s+([a-z\-\s]+)",
        r"to\s+([a-z\-\s]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("destination pattern must compile"))
    .collect()
});

/// Parse a free-text travel query into destination and intent.
///
/// Punctuation is treated as a separator, never silently deleted, so
/// `"Bangalore!"` and `"Bangalore"` normalize identically.
#[must_use]
pub fn parse_query(text: &str) -> ParsedQuery {
    let normalized = normalize(text.trim());

    let has_weather = WEATHER_KEYWORDS.iter().any(|k| normalized.contains(k));
    let has_places = PLACES_KEYWORDS.iter().any(|k| normalized.contains(k));

    let intent = match (has_weather, has_places) {
        (true, false) => Intent::Weather,
        (false, true) => Intent::Places,
        // Both sets present is deliberately equivalent to neither.
        _ => Intent::Both,
    };

    let destination = DESTINATION_PATTERNS
        .iter()
        .find_map(|pattern| {
            pattern
                .captures(&normalized)
                .and_then(|captures| captures.get(1))
                .map(|group| group.as_str().to_string())
        })
        .unwrap_or_else(|| normalized.clone());

    ParsedQuery {
        destination: collapse_whitespace(&destination),
        intent,
    }
}

/// Lowercase and replace everything except letters, whitespace and
/// hyphens with a space
fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() || c.is_whitespace() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect()
}

/// Collapse internal whitespace runs to single spaces and trim
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
