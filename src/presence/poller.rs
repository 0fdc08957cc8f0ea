use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::SessionStore;
use crate::feed::{dedup_by_name, FeedError, SnapshotFeed};
use crate::log_worker;
use crate::scheduler::PeriodicTask;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const TASK_NAME: &str = "online-tracker";

/// What one reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub online: usize,
    pub opened: usize,
    pub closed: usize,
    pub failures: usize,
}

/// Keeps stored sessions in line with the online roster.
///
/// `last_known` maps each name seen online in the previous successful poll to
/// its actor id. It lives and dies with this poller.
pub struct PresencePoller<F, S> {
    feed: F,
    store: S,
    interval: Duration,
    last_known: HashMap<String, i64>,
}

impl<F, S> PresencePoller<F, S>
where
    F: SnapshotFeed,
    S: SessionStore,
{
    pub fn new(feed: F, store: S, interval: Duration) -> Self {
        Self {
            feed,
            store,
            interval,
            last_known: HashMap::new(),
        }
    }

    pub fn last_known(&self) -> &HashMap<String, i64> {
        &self.last_known
    }

    /// Fetches the roster and opens/closes sessions stamped with `now`.
    ///
    /// A failed fetch returns the error and leaves every session and the
    /// last-known set untouched.
    pub async fn poll_at(&mut self, now: DateTime<Utc>) -> Result<PollSummary, FeedError> {
        let players = dedup_by_name(self.feed.fetch_online().await?);

        let mut summary = PollSummary {
            online: players.len(),
            ..PollSummary::default()
        };
        let mut current: HashMap<String, i64> = HashMap::with_capacity(players.len());

        for player in &players {
            let actor_id = match self
                .store
                .find_or_create_actor(
                    &player.name,
                    player.level,
                    &player.vocation,
                    &player.country,
                    now,
                )
                .await
            {
                Ok(actor) => actor.id,
                Err(err) => {
                    summary.failures += 1;
                    log_worker!(warn, TASK_NAME, "Error creating/updating player {}: {:#}", player.name, err);
                    // Still online as far as we know; don't let this turn into a logout.
                    if let Some(&known_id) = self.last_known.get(&player.name) {
                        current.insert(player.name.clone(), known_id);
                    }
                    continue;
                }
            };

            if !self.last_known.contains_key(&player.name) {
                match self.open_session(actor_id, now).await {
                    Ok(true) => summary.opened += 1,
                    Ok(false) => {
                        log_debug!("{} already has an open session, reusing it", player.name);
                    }
                    Err(err) => {
                        summary.failures += 1;
                        log_worker!(warn, TASK_NAME, "Error creating session for {}: {:#}", player.name, err);
                        // Left out of `current` so the next poll retries the login.
                        continue;
                    }
                }
            }

            current.insert(player.name.clone(), actor_id);
        }

        for (name, &actor_id) in &self.last_known {
            if current.contains_key(name) {
                continue;
            }

            match self.close_active_session(actor_id, now).await {
                Ok(true) => summary.closed += 1,
                Ok(false) => {
                    log_debug!("{} went offline without an open session", name);
                }
                Err(err) => {
                    summary.failures += 1;
                    log_worker!(warn, TASK_NAME, "Error closing session for {}: {:#}", name, err);
                    // Kept so the next poll retries the logout.
                    current.insert(name.clone(), actor_id);
                }
            }
        }

        self.last_known = current;
        Ok(summary)
    }

    /// Closes the open session of every actor in the last-known set at `now` and
    /// forgets them. Returns how many sessions were closed.
    pub async fn close_all_at(&mut self, now: DateTime<Utc>) -> usize {
        let mut closed = 0;
        for (name, actor_id) in self.last_known.drain() {
            match close_active_session(&self.store, actor_id, now).await {
                Ok(true) => closed += 1,
                Ok(false) => {}
                Err(err) => {
                    log_worker!(error, TASK_NAME, "Error closing session for {} on shutdown: {:#}", name, err);
                }
            }
        }
        closed
    }

    async fn open_session(&self, actor_id: i64, now: DateTime<Utc>) -> Result<bool> {
        if self.store.find_active_session(actor_id).await?.is_some() {
            return Ok(false);
        }
        self.store.create_session(actor_id, now).await?;
        Ok(true)
    }

    async fn close_active_session(&self, actor_id: i64, now: DateTime<Utc>) -> Result<bool> {
        close_active_session(&self.store, actor_id, now).await
    }
}

async fn close_active_session<S: SessionStore>(
    store: &S,
    actor_id: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    match store.find_active_session(actor_id).await? {
        Some(session) => store.close_session(session.id, now).await,
        None => Ok(false),
    }
}

#[async_trait]
impl<F, S> PeriodicTask for PresencePoller<F, S>
where
    F: SnapshotFeed + 'static,
    S: SessionStore + 'static,
{
    fn name(&self) -> &str {
        TASK_NAME
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run_cycle(&mut self) -> Result<()> {
        let summary = self.poll_at(Utc::now()).await?;
        log_worker!(
            info,
            TASK_NAME,
            "Tracked {} online players ({} logins, {} logouts, {} failures)",
            summary.online,
            summary.opened,
            summary.closed,
            summary.failures
        );
        Ok(())
    }

    async fn shutdown(&mut self) {
        let still_online = self.last_known.len();
        let closed = self.close_all_at(Utc::now()).await;
        log_worker!(info, TASK_NAME, "Closed {} of {} sessions on shutdown", closed, still_online);
    }
}
