//! URL output formatter
//!
//! One map link per line: a place link for each place, or a directions
//! link for a route.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{OutputFormatter, Report};

/// URL formatter - outputs map share links
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format URLs with optional provider override
    pub fn format_with_provider(
        &self,
        report: &Report,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        let links: Vec<String> = match report {
            Report::Places { places, .. } => places
                .iter()
                .filter_map(|p| p.coordinates())
                .map(|c| config.format_url(provider, c.lat, c.lon))
                .collect::<Result<_>>()?,
            Report::Exploration { place, .. } => {
                let c = place.coordinates().ok_or_else(|| {
                    Error::InvalidPlace(format!("{} has no coordinates", place.title))
                })?;
                vec![config.format_url(provider, c.lat, c.lon)?]
            }
            Report::Route { route, .. } => match (route.origin(), route.destination()) {
                (Some(from), Some(to)) => {
                    vec![config.format_directions_url((from.lat, from.lon), (to.lat, to.lon))]
                }
                _ => return Err(Error::InvalidPlace("Route has no coordinates".to_string())),
            },
            Report::Location { lat, lon, .. } => vec![config.format_url(provider, *lat, *lon)?],
            Report::Saved { places } => places
                .iter()
                .map(|p| config.format_url(provider, p.latitude, p.longitude))
                .collect::<Result<_>>()?,
        };

        Ok(links.join("\n"))
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map share links"
    }

    fn format(&self, report: &Report, config: &Config) -> Result<String> {
        self.format_with_provider(report, config, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_url_format_default_provider() {
        let output = UrlFormatter.format(&fixtures::places(), &Config::default()).unwrap();

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("openstreetmap.org"));
        assert!(lines[0].contains("48.8566"));
    }

    #[test]
    fn test_url_format_with_provider() {
        let output = UrlFormatter
            .format_with_provider(&fixtures::exploration(), &Config::default(), Some("google"))
            .unwrap();
        assert!(output.contains("google.com/maps"));
    }

    #[test]
    fn test_url_format_unknown_provider() {
        let result = UrlFormatter.format_with_provider(&fixtures::places(), &Config::default(), Some("nope"));
        assert!(result.is_err());
    }

    #[test]
    fn test_route_url() {
        let output = UrlFormatter.format(&fixtures::route(), &Config::default()).unwrap();
        assert_eq!(
            output,
            "https://www.openstreetmap.org/directions?route=48.8566,2.3522;45.764,4.8357"
        );
    }

    #[test]
    fn test_url_formatter_info() {
        let formatter = UrlFormatter;
        assert_eq!(formatter.name(), "url");
        assert!(!formatter.description().is_empty());
    }
}
