use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::db::SessionStore;

use super::confidence::{classify_matches, ConfidenceThresholds, ScanResult, TierReport};
use super::interval::{correlate, CorrelationMatch, Interval};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

pub const DEFAULT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_MAX_RESULTS: usize = 20;
/// Largest window `chrono::Duration` can represent in seconds.
const MAX_WINDOW_SECS: u64 = (i64::MAX / 1000) as u64;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("character {0} not found or has no recorded sessions")]
    TargetNotFound(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Finds actors whose sessions hand off with a target's but never overlap them.
///
/// Reads only; safe to run while the poller is writing.
pub struct CorrelationScanner<S> {
    store: S,
    thresholds: ConfidenceThresholds,
}

impl<S: SessionStore> CorrelationScanner<S> {
    pub fn new(store: S, thresholds: ConfidenceThresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn thresholds(&self) -> &ConfidenceThresholds {
        &self.thresholds
    }

    pub async fn scan(
        &self,
        target_name: &str,
        window_secs: u64,
        max_results: usize,
    ) -> Result<Vec<CorrelationMatch>, ScanError> {
        self.scan_at(target_name, window_secs, max_results, Utc::now())
            .await
    }

    /// Same as [`scan`](Self::scan) with open sessions treated as ending at `now`.
    pub async fn scan_at(
        &self,
        target_name: &str,
        window_secs: u64,
        max_results: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<CorrelationMatch>, ScanError> {
        let target = self
            .store
            .find_actor_by_name(target_name)
            .await
            .with_context(|| format!("Failed to look up {target_name}"))?
            .ok_or_else(|| ScanError::TargetNotFound(target_name.to_string()))?;

        let target_intervals: Vec<Interval> = self
            .store
            .list_sessions_by_actor(target.id)
            .await
            .with_context(|| format!("Failed to load sessions for {target_name}"))?
            .iter()
            .map(|session| Interval::from_session(session, now))
            .collect();

        if target_intervals.is_empty() {
            return Err(ScanError::TargetNotFound(target_name.to_string()));
        }

        let candidates = self
            .store
            .list_candidate_histories(target.id)
            .await
            .context("Failed to load candidate sessions")?;

        log_debug!(
            "Scanning {} ({} sessions) against {} candidates",
            target_name,
            target_intervals.len(),
            candidates.len()
        );

        let window = Duration::seconds(window_secs.min(MAX_WINDOW_SECS) as i64);
        let histories = candidates.into_iter().map(|history| {
            let intervals = history
                .sessions
                .iter()
                .map(|session| Interval::from_session(session, now))
                .collect();
            (history.actor.name, intervals)
        });

        Ok(correlate(&target_intervals, histories, window, max_results))
    }

    /// Ranked matches with a confidence tier; those below the lowest tier are dropped.
    pub async fn scan_classified(
        &self,
        target_name: &str,
        window_secs: u64,
        max_results: usize,
    ) -> Result<Vec<ScanResult>, ScanError> {
        let matches = self.scan(target_name, window_secs, max_results).await?;
        Ok(classify_matches(matches, &self.thresholds))
    }

    pub async fn report(
        &self,
        target_name: &str,
        window_secs: u64,
        max_results: usize,
    ) -> Result<TierReport, ScanError> {
        let results = self
            .scan_classified(target_name, window_secs, max_results)
            .await?;
        Ok(TierReport::from_results(results))
    }
}
