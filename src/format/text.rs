//! Human-readable text output formatter

use crate::compose::Viewport;
use crate::config::Config;
use crate::directions::RouteResult;
use crate::error::Result;
use crate::format::{OutputFormatter, Report};
use crate::place::Place;
use chrono::{DateTime, Local};
use std::fmt::Write;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

fn coords(place: &Place) -> String {
    match place.coordinates() {
        Some(c) => format!("({:.6}, {:.6})", c.lat, c.lon),
        None => "(no coordinates)".to_string(),
    }
}

fn place_list(out: &mut String, heading: &str, places: &[Place]) {
    if places.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}:", heading);
    for place in places {
        let _ = writeln!(out, "  - {} {}", place.title, coords(place));
    }
}

fn viewport_line(viewport: &Viewport) -> String {
    match viewport {
        Viewport::FitBounds { south_west, north_east, .. } => format!(
            "fit ({:.4}, {:.4}) to ({:.4}, {:.4})",
            south_west[0], south_west[1], north_east[0], north_east[1]
        ),
        Viewport::Center { center, zoom } => {
            format!("center ({:.4}, {:.4}) at zoom {}", center[0], center[1], zoom)
        }
        Viewport::Placeholder { message } => message.clone(),
    }
}

/// Route panel: totals, ETA and numbered steps
pub fn route_text(origin: &str, destination: &str, route: &RouteResult, departure: DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} -> {}", origin, destination);
    let _ = writeln!(out, "Distance: {:.2} km", route.distance_km());
    let _ = writeln!(out, "Duration: {:.1} hours", route.duration_hours());
    match route.eta(departure) {
        Some(arrival) => {
            let _ = writeln!(out, "ETA: {}", arrival.format("%H:%M"));
        }
        None => out.push_str("ETA: unknown\n"),
    }

    if !route.steps.is_empty() {
        out.push_str("\nSteps:\n");
        for (i, step) in route.steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, step.instruction);
            if let Some(road) = &step.road_name {
                let _ = writeln!(out, "     via {}", road);
            }
            let _ = writeln!(out, "     {:.2} km", step.distance_meters / 1000.0);
        }
    }
    out
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, report: &Report, _config: &Config) -> Result<String> {
        let mut out = String::new();

        match report {
            Report::Places { term, places } => {
                if places.is_empty() {
                    let _ = writeln!(out, "No results for \"{}\"", term);
                }
                for (i, place) in places.iter().enumerate() {
                    let _ = writeln!(out, "{}. {}", i + 1, place.title);
                    if !place.description.is_empty() {
                        let _ = writeln!(out, "   {}", place.description);
                    }
                    let _ = writeln!(out, "   {}", coords(place));
                }
            }
            Report::Exploration { place, enrichment, plan } => {
                let _ = writeln!(out, "{}", place.title);
                let _ = writeln!(out, "{}", place.description);
                let _ = writeln!(out, "Location: {}", coords(place));

                match &enrichment.weather {
                    Some(w) => {
                        let _ = writeln!(
                            out,
                            "Weather: {}°C, {} (as of {})",
                            w.temperature,
                            w.description,
                            w.local_time()
                        );
                    }
                    None => out.push_str("Weather: unavailable\n"),
                }

                if let Some(wiki) = &enrichment.wiki_summary {
                    let _ = writeln!(out, "\nOverview:\n  {}", wiki.summary);
                    if !wiki.url.is_empty() {
                        let _ = writeln!(out, "  {}", wiki.url);
                    }
                }

                if enrichment.boundary.is_some() {
                    out.push_str("\nBoundary: available\n");
                }
                place_list(&mut out, "Nearby hospitals", &enrichment.nearby_hospitals);
                place_list(&mut out, "Nearby notable places", &enrichment.nearby_notable);

                let _ = writeln!(out, "\nMap: {} markers, {}", plan.markers.len(), viewport_line(&plan.viewport));
            }
            Report::Route { origin, destination, route, departure } => {
                out.push_str(&route_text(origin, destination, route, *departure));
            }
            Report::Location { name, lat, lon } => {
                let _ = writeln!(out, "{} ({:.6}, {:.6})", name, lat, lon);
            }
            Report::Saved { places } => {
                if places.is_empty() {
                    out.push_str("No saved places\n");
                }
                for place in places {
                    let _ = writeln!(
                        out,
                        "{}  {} ({:.6}, {:.6})  {} visits, {} favorites",
                        place.id,
                        place.name,
                        place.latitude,
                        place.longitude,
                        place.location_history.len(),
                        place.favorite_locations.len()
                    );
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_places_text() {
        let output = TextFormatter.format(&fixtures::places(), &Config::default()).unwrap();
        assert!(output.contains("1. Paris, France"));
        assert!(output.contains("2. Paris, Texas"));
        assert!(output.contains("(48.856600, 2.352200)"));
    }

    #[test]
    fn test_empty_places_text() {
        let report = Report::Places { term: "Atlantis".to_string(), places: vec![] };
        let output = TextFormatter.format(&report, &Config::default()).unwrap();
        assert!(output.contains("No results for \"Atlantis\""));
    }

    #[test]
    fn test_exploration_text() {
        let output = TextFormatter.format(&fixtures::exploration(), &Config::default()).unwrap();
        assert!(output.contains("Weather: 18°C, Cloudy (as of 02:05 PM)"));
        assert!(output.contains("Paris is the capital of France."));
        assert!(output.contains("Nearby hospitals:"));
        assert!(output.contains("at zoom 10"));
    }

    #[test]
    fn test_route_text() {
        let output = TextFormatter.format(&fixtures::route(), &Config::default()).unwrap();
        assert!(output.contains("Paris -> Lyon"));
        assert!(output.contains("Distance: 465.32 km"));
        assert!(output.contains("Duration: 4.5 hours"));
        assert!(output.contains("ETA: 14:30"));
        assert!(output.contains("via Rue de Rivoli"));
        assert!(output.contains("1.23 km"));
    }

    #[test]
    fn test_route_text_without_eta() {
        let Report::Route { origin, destination, mut route, departure } = fixtures::route() else {
            panic!("expected a route report");
        };
        route.summary.duration_seconds = 1e300;

        let output = route_text(&origin, &destination, &route, departure);
        assert!(output.contains("ETA: unknown"));
        assert!(output.contains("Paris -> Lyon"));
    }

    #[test]
    fn test_text_formatter_info() {
        let formatter = TextFormatter;
        assert_eq!(formatter.name(), "text");
        assert!(!formatter.description().is_empty());
    }
}
