use chrono::{DateTime, Utc};

use super::Session;

/// A tracked character. Stats are the latest values seen in the online feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub level: u32,
    pub vocation: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Actor {
    pub fn stats_differ(&self, level: u32, vocation: &str, country: &str) -> bool {
        self.level != level || self.vocation != vocation || self.country != country
    }
}

/// An actor together with its complete session history, oldest first.
#[derive(Debug, Clone)]
pub struct ActorHistory {
    pub actor: Actor,
    pub sessions: Vec<Session>,
}
