//! Human-readable text output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::jobs::{format_duration, JobReport};
use crate::search::NearbyResults;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format_results(&self, results: &NearbyResults) -> Result<String> {
        let mut output = String::new();

        if results.total == 0 {
            output.push_str("No shops found\n");
        } else {
            output.push_str(&format!(
                "{} shops (page {} of {})\n\n",
                results.total, results.page, results.total_pages
            ));
        }

        for listing in &results.listings {
            let distance = results
                .distances
                .get(&listing.id)
                .map(|d| format!("{:.1} mi", d))
                .unwrap_or_default();
            let rating = listing
                .rating
                .map(|r| format!("{:.1}*", r))
                .unwrap_or_else(|| "unrated".to_string());

            output.push_str(&format!("  {:>8}  {}  ({})\n", distance, listing.name, rating));
            if let Some(address) = &listing.address {
                output.push_str(&format!("            {}\n", address));
            }
        }

        if !results.nearest_cities.is_empty() {
            output.push_str("\nNearby areas:\n");
            for city in &results.nearest_cities {
                output.push_str(&format!(
                    "  {}, {} ({:.1} mi)\n",
                    city.name, city.state_abbr, city.distance_miles
                ));
            }
        }

        Ok(output)
    }

    fn format_report(&self, report: &JobReport) -> Result<String> {
        let elapsed = (report.finished_at - report.started_at)
            .to_std()
            .unwrap_or_default();

        let mut output = String::new();
        output.push_str(&format!("{} geocoding ({})\n", report.job, report.backend));
        output.push_str(&format!("  Processed: {}\n", report.processed));
        output.push_str(&format!(
            "  Succeeded: {} ({:.1}%)\n",
            report.succeeded,
            report.success_rate() * 100.0
        ));
        output.push_str(&format!("  Failed:    {}\n", report.failed));
        if report.skipped > 0 {
            output.push_str(&format!("  Skipped:   {}\n", report.skipped));
        }
        output.push_str(&format!("  Elapsed:   {}\n", format_duration(elapsed)));

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_text_results() {
        let output = TextFormatter.format_results(&fixtures::results()).unwrap();

        assert!(output.contains("13 shops (page 1 of 2)"));
        assert!(output.contains("2.3 mi"));
        assert!(output.contains("Black Lotus Tattoo"));
        assert!(output.contains("4.8*"));
        assert!(output.contains("Nearby areas:"));
        assert!(output.contains("Austin, TX"));
    }

    #[test]
    fn test_text_empty_results() {
        let mut results = fixtures::results();
        results.listings.clear();
        results.nearest_cities.clear();
        results.total = 0;

        let output = TextFormatter.format_results(&results).unwrap();
        assert!(output.contains("No shops found"));
        assert!(!output.contains("Nearby areas"));
    }

    #[test]
    fn test_text_report() {
        let output = TextFormatter.format_report(&fixtures::report()).unwrap();
        assert!(output.contains("address geocoding (nominatim)"));
        assert!(output.contains("Succeeded: 4 (80.0%)"));
        assert!(output.contains("Elapsed:   6s"));
        assert!(!output.contains("Skipped"));
    }

    #[test]
    fn test_text_formatter_info() {
        assert_eq!(TextFormatter.name(), "text");
        assert!(!TextFormatter.description().is_empty());
    }
}
