//! Interval algebra behind the alt scan.
//!
//! Everything here is pure: callers turn stored sessions into [`Interval`]s
//! (open sessions end at "now") and hand them over with the adjacency window.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use crate::db::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Open sessions extend to `now`, never before their own login.
    pub fn from_session(session: &Session, now: DateTime<Utc>) -> Self {
        Self {
            start: session.login_at,
            end: session.effective_end(now).max(session.login_at),
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

fn within(delta: Duration, window: Duration) -> bool {
    delta < window && delta > -window
}

/// One side logged off within `window` of the other logging on, either way round.
pub fn is_adjacent(target: &Interval, candidate: &Interval, window: Duration) -> bool {
    within(candidate.end - target.start, window) || within(target.end - candidate.start, window)
}

pub fn any_overlap(target: &[Interval], candidate: &[Interval]) -> bool {
    target
        .iter()
        .any(|t| candidate.iter().any(|c| t.overlaps(c)))
}

/// Number of `(target, candidate)` interval pairs that are adjacent.
pub fn count_adjacent(target: &[Interval], candidate: &[Interval], window: Duration) -> usize {
    target
        .iter()
        .map(|t| candidate.iter().filter(|c| is_adjacent(t, c, window)).count())
        .sum()
}

/// Raw scan hit: a candidate that never overlapped the target and switched with it
/// at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationMatch {
    pub actor_name: String,
    pub adjacent_count: usize,
}

/// Highest count first; equal counts fall back to name order so output is stable.
fn rank(a: &CorrelationMatch, b: &CorrelationMatch) -> Ordering {
    b.adjacent_count
        .cmp(&a.adjacent_count)
        .then_with(|| a.actor_name.cmp(&b.actor_name))
}

/// Filters `candidates` down to non-overlapping actors with at least one adjacent
/// transition, ranked and capped at `max_results`.
pub fn correlate<I>(
    target: &[Interval],
    candidates: I,
    window: Duration,
    max_results: usize,
) -> Vec<CorrelationMatch>
where
    I: IntoIterator<Item = (String, Vec<Interval>)>,
{
    let mut matches: Vec<CorrelationMatch> = candidates
        .into_iter()
        .filter(|(_, intervals)| !any_overlap(target, intervals))
        .filter_map(|(actor_name, intervals)| {
            let adjacent_count = count_adjacent(target, &intervals, window);
            (adjacent_count > 0).then_some(CorrelationMatch {
                actor_name,
                adjacent_count,
            })
        })
        .collect();

    matches.sort_by(rank);
    matches.truncate(max_results);
    matches
}
