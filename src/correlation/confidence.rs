use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

use super::interval::CorrelationMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    /// Strongest first.
    pub const DESCENDING: [ConfidenceTier; 4] = [
        ConfidenceTier::VeryHigh,
        ConfidenceTier::High,
        ConfidenceTier::Medium,
        ConfidenceTier::Low,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "Low Confidence",
            ConfidenceTier::Medium => "Medium Confidence",
            ConfidenceTier::High => "High Confidence",
            ConfidenceTier::VeryHigh => "Very High Confidence",
        }
    }
}

/// Minimum adjacent-transition counts for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceThresholds {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub very_high: usize,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            low: 3,
            medium: 5,
            high: 10,
            very_high: 15,
        }
    }
}

impl ConfidenceThresholds {
    pub fn new(low: usize, medium: usize, high: usize, very_high: usize) -> Result<Self, ConfigError> {
        let thresholds = Self {
            low,
            medium,
            high,
            very_high,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ascending = 0 < self.low
            && self.low < self.medium
            && self.medium < self.high
            && self.high < self.very_high;
        if ascending {
            Ok(())
        } else {
            Err(ConfigError::Thresholds {
                low: self.low,
                medium: self.medium,
                high: self.high,
                very_high: self.very_high,
            })
        }
    }

    /// `None` below `low`: such candidates are left out of classified output.
    pub fn classify(&self, adjacent_count: usize) -> Option<ConfidenceTier> {
        if adjacent_count >= self.very_high {
            Some(ConfidenceTier::VeryHigh)
        } else if adjacent_count >= self.high {
            Some(ConfidenceTier::High)
        } else if adjacent_count >= self.medium {
            Some(ConfidenceTier::Medium)
        } else if adjacent_count >= self.low {
            Some(ConfidenceTier::Low)
        } else {
            None
        }
    }

    /// Inclusive count range covered by `tier`; `VeryHigh` is open-ended.
    pub fn bounds(&self, tier: ConfidenceTier) -> (usize, Option<usize>) {
        match tier {
            ConfidenceTier::Low => (self.low, Some(self.medium - 1)),
            ConfidenceTier::Medium => (self.medium, Some(self.high - 1)),
            ConfidenceTier::High => (self.high, Some(self.very_high - 1)),
            ConfidenceTier::VeryHigh => (self.very_high, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub actor_name: String,
    pub adjacent_count: usize,
    pub confidence: ConfidenceTier,
}

/// Tags each raw match with its tier, dropping those under the lowest threshold.
/// Input order is kept.
pub fn classify_matches(
    matches: Vec<CorrelationMatch>,
    thresholds: &ConfidenceThresholds,
) -> Vec<ScanResult> {
    matches
        .into_iter()
        .filter_map(|m| {
            thresholds.classify(m.adjacent_count).map(|confidence| ScanResult {
                actor_name: m.actor_name,
                adjacent_count: m.adjacent_count,
                confidence,
            })
        })
        .collect()
}

/// Classified results bucketed by tier, for presentation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierReport {
    pub very_high: Vec<ScanResult>,
    pub high: Vec<ScanResult>,
    pub medium: Vec<ScanResult>,
    pub low: Vec<ScanResult>,
}

impl TierReport {
    pub fn from_results(results: Vec<ScanResult>) -> Self {
        let mut report = Self::default();
        for result in results {
            report.bucket_mut(result.confidence).push(result);
        }
        report
    }

    pub fn bucket(&self, tier: ConfidenceTier) -> &[ScanResult] {
        match tier {
            ConfidenceTier::VeryHigh => &self.very_high,
            ConfidenceTier::High => &self.high,
            ConfidenceTier::Medium => &self.medium,
            ConfidenceTier::Low => &self.low,
        }
    }

    fn bucket_mut(&mut self, tier: ConfidenceTier) -> &mut Vec<ScanResult> {
        match tier {
            ConfidenceTier::VeryHigh => &mut self.very_high,
            ConfidenceTier::High => &mut self.high,
            ConfidenceTier::Medium => &mut self.medium,
            ConfidenceTier::Low => &mut self.low,
        }
    }

    pub fn len(&self) -> usize {
        self.very_high.len() + self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
