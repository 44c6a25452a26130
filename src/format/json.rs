//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{OutputFormatter, Report};

/// JSON formatter - outputs the full report as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON report"
    }

    fn format(&self, report: &Report, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_exploration_json() {
        let output = JsonFormatter.format(&fixtures::exploration(), &Config::default()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["kind"], "exploration");
        assert_eq!(parsed["place"]["title"], "Paris, France");
        assert_eq!(parsed["enrichment"]["weather"]["description"], "Cloudy");
        assert_eq!(parsed["plan"]["viewport"]["kind"], "center");
    }

    #[test]
    fn test_route_json_keeps_lon_lat_order() {
        let output = JsonFormatter.format(&fixtures::route(), &Config::default()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["route"]["coordinates"][0][0], 2.3522);
        assert_eq!(parsed["route"]["summary"]["distance_meters"], 465_321.0);
    }

    #[test]
    fn test_json_formatter_info() {
        let formatter = JsonFormatter;
        assert_eq!(formatter.name(), "json");
        assert!(!formatter.description().is_empty());
    }
}
