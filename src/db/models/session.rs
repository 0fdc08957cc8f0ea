//! Presence session records.
//!
//! A session is the half-open interval `[login_at, logout_at)` during which one
//! actor was observed online. `logout_at == None` marks the actor as still online
//! (or the tracker died before it could close the row).

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: i64,
    pub actor_id: i64,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.logout_at.is_none()
    }

    /// End of the interval, with open sessions extending to `now`.
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.logout_at.unwrap_or(now)
    }
}
