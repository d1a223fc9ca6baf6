//! JSON output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::jobs::JobReport;
use crate::search::NearbyResults;

/// JSON formatter - outputs the full structure as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON output"
    }

    fn format_results(&self, results: &NearbyResults) -> Result<String> {
        Ok(serde_json::to_string_pretty(results)?)
    }

    fn format_report(&self, report: &JobReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_json_results() {
        let output = JsonFormatter.format_results(&fixtures::results()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["total"], 13);
        assert_eq!(parsed["distances"]["7"], 2.3);
        assert_eq!(parsed["listings"][0]["status"], "active");
        assert_eq!(parsed["nearest_cities"][0]["name"], "Austin");

        let back: NearbyResults = serde_json::from_str(&output).unwrap();
        assert_eq!(back, fixtures::results());
    }

    #[test]
    fn test_json_report() {
        let output = JsonFormatter.format_report(&fixtures::report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["job"], "address");
        assert_eq!(parsed["failed"], 1);
    }

    #[test]
    fn test_json_formatter_info() {
        assert_eq!(JsonFormatter.name(), "json");
        assert!(!JsonFormatter.description().is_empty());
    }
}
