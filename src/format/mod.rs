//! Output formatters
//!
//! Provides trait-based output formatting for search results, explored
//! places, routes and saved places.

pub mod gpx;
pub mod json;
pub mod text;
pub mod url;

use crate::compose::RenderPlan;
use crate::config::Config;
use crate::directions::RouteResult;
use crate::enrichment::EnrichmentBundle;
use crate::error::Result;
use crate::place::Place;
use crate::store::StoredPlace;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Something the CLI can print
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    /// Search results
    Places { term: String, places: Vec<Place> },
    /// A selected place with its enrichment and map plan
    Exploration {
        place: Place,
        enrichment: EnrichmentBundle,
        plan: RenderPlan,
    },
    /// A route between two named places
    Route {
        origin: String,
        destination: String,
        route: RouteResult,
        departure: DateTime<Local>,
    },
    /// A reverse-geocoded coordinate
    Location { name: String, lat: f64, lon: f64 },
    /// Places from the local store
    Saved { places: Vec<StoredPlace> },
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a report
    ///
    /// `config` supplies map URL templates.
    fn format(&self, report: &Report, config: &Config) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [
        json::JsonFormatter.describe(),
        text::TextFormatter.describe(),
        gpx::GpxFormatter.describe(),
        url::UrlFormatter.describe(),
    ]
    .into()
}

trait Describe {
    fn describe(&self) -> FormatInfo;
}

impl<T: OutputFormatter> Describe for T {
    fn describe(&self) -> FormatInfo {
        FormatInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("gpx").is_some());
        assert!(get_formatter("url").is_some());
        assert!(get_formatter("unknown").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Text").is_some());
        assert!(get_formatter("GPX").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 4);
        assert!(formats.iter().any(|f| f.name == "json"));
        assert!(formats.iter().any(|f| f.name == "url"));
        assert!(formats.iter().all(|f| !f.description.is_empty()));
    }
}
