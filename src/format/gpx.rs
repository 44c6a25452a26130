//! GPX output formatter
//!
//! Places become waypoints; a route becomes a track plus its two endpoints.

use crate::config::Config;
use crate::error::Result;
use crate::format::{OutputFormatter, Report};
use crate::place::{LonLat, Place};

/// GPX formatter - outputs GPX waypoints and tracks
pub struct GpxFormatter;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn waypoint(gpx: &mut String, at: LonLat, name: &str, desc: Option<&str>, symbol: &str) {
    gpx.push_str(&format!(r#"  <wpt lat="{}" lon="{}">"#, at.lat, at.lon));
    gpx.push('\n');
    gpx.push_str(&format!("    <name>{}</name>\n", escape(name)));
    if let Some(desc) = desc.filter(|d| !d.is_empty()) {
        gpx.push_str(&format!("    <desc>{}</desc>\n", escape(desc)));
    }
    gpx.push_str(&format!("    <sym>{}</sym>\n", symbol));
    gpx.push_str("  </wpt>\n");
}

fn place_waypoints(gpx: &mut String, places: &[Place], symbol: &str) {
    for place in places {
        if let Some(at) = place.coordinates() {
            waypoint(gpx, at, &place.title, Some(&place.description), symbol);
        }
    }
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoints and tracks"
    }

    fn format(&self, report: &Report, _config: &Config) -> Result<String> {
        let mut gpx = String::new();

        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="place-explorer">"#);
        gpx.push('\n');

        match report {
            Report::Places { places, .. } => place_waypoints(&mut gpx, places, "flag"),
            Report::Exploration { place, enrichment, .. } => {
                place_waypoints(&mut gpx, std::slice::from_ref(place), "flag");
                place_waypoints(&mut gpx, &enrichment.nearby_hospitals, "medical");
                place_waypoints(&mut gpx, &enrichment.nearby_notable, "attraction");
            }
            Report::Route { origin, destination, route, .. } => {
                if let Some(start) = route.origin() {
                    waypoint(&mut gpx, start, origin, None, "start");
                }
                if let Some(end) = route.destination() {
                    waypoint(&mut gpx, end, destination, None, "finish");
                }

                gpx.push_str("  <trk>\n");
                gpx.push_str(&format!(
                    "    <name>{} to {}</name>\n",
                    escape(origin),
                    escape(destination)
                ));
                gpx.push_str("    <trkseg>\n");
                for point in &route.coordinates {
                    gpx.push_str(&format!(
                        "      <trkpt lat=\"{}\" lon=\"{}\"/>\n",
                        point.lat, point.lon
                    ));
                }
                gpx.push_str("    </trkseg>\n");
                gpx.push_str("  </trk>\n");
            }
            Report::Location { name, lat, lon } => {
                waypoint(&mut gpx, LonLat::new(*lon, *lat), name, None, "flag");
            }
            Report::Saved { places } => {
                for place in places {
                    waypoint(
                        &mut gpx,
                        LonLat::new(place.longitude, place.latitude),
                        &place.name,
                        None,
                        "flag",
                    );
                    for favorite in &place.favorite_locations {
                        waypoint(
                            &mut gpx,
                            LonLat::new(favorite.longitude, favorite.latitude),
                            &favorite.name,
                            Some(&place.name),
                            "star",
                        );
                    }
                }
            }
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_places_gpx() {
        let output = GpxFormatter.format(&fixtures::places(), &Config::default()).unwrap();

        assert!(output.contains(r#"<?xml version="1.0""#));
        assert!(output.contains(r#"<gpx version="1.1""#));
        assert_eq!(output.matches("<wpt").count(), 2);
        assert!(output.contains(r#"<wpt lat="48.8566" lon="2.3522">"#));
        assert!(output.contains("</gpx>"));
    }

    #[test]
    fn test_exploration_gpx_escapes_names() {
        let output = GpxFormatter.format(&fixtures::exploration(), &Config::default()).unwrap();
        assert!(output.contains("<name>Notre-Dame &amp; Cloister</name>"));
        assert!(output.contains("<sym>medical</sym>"));
    }

    #[test]
    fn test_route_gpx_track() {
        let output = GpxFormatter.format(&fixtures::route(), &Config::default()).unwrap();
        assert!(output.contains("<trk>"));
        assert_eq!(output.matches("<trkpt").count(), 2);
        assert!(output.contains("<sym>start</sym>"));
        assert!(output.contains("<name>Paris to Lyon</name>"));
    }

    #[test]
    fn test_gpx_formatter_info() {
        let formatter = GpxFormatter;
        assert_eq!(formatter.name(), "gpx");
        assert!(!formatter.description().is_empty());
    }
}
