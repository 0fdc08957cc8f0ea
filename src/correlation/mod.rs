//! Alt-character correlation: interval adjacency scoring, confidence tiers and
//! the store-backed scanner.

pub mod confidence;
pub mod interval;
pub mod scanner;

pub use confidence::{ConfidenceThresholds, ConfidenceTier, ScanResult, TierReport};
pub use interval::{CorrelationMatch, Interval};
pub use scanner::{CorrelationScanner, ScanError, DEFAULT_MAX_RESULTS, DEFAULT_WINDOW_SECS};
