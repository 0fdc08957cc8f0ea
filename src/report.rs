//! Plain-text rendering of a scan for the terminal.

use std::time::Duration;

use crate::correlation::{ConfidenceThresholds, ConfidenceTier, TierReport};

pub fn render_report(
    target: &str,
    report: &TierReport,
    thresholds: &ConfidenceThresholds,
    analyzed: i64,
    elapsed: Duration,
) -> String {
    let mut lines = vec![
        format!("Scanning for characters related to {target}..."),
        String::new(),
    ];

    if report.is_empty() {
        lines.push("No related characters found based on login/logout patterns.".to_string());
        lines.push(String::new());
    }

    for tier in ConfidenceTier::DESCENDING {
        let results = report.bucket(tier);
        if results.is_empty() {
            continue;
        }

        let range = match thresholds.bounds(tier) {
            (min, Some(max)) => format!("{min}-{max}"),
            (min, None) => format!("{min}+"),
        };
        lines.push(format!("{} ({range} adjacent transitions):", tier.label()));
        lines.extend(results.iter().map(|result| {
            format!(
                "  - {}: {} adjacent transitions, never online together",
                result.actor_name, result.adjacent_count
            )
        }));
        lines.push(String::new());
    }

    lines.push(format!(
        "Analyzed {analyzed} characters in {:.2}s",
        elapsed.as_secs_f64()
    ));
    lines.join("\n")
}

pub fn render_not_found(target: &str) -> String {
    format!("Character {target} not found in database. It may not have been tracked yet.")
}
