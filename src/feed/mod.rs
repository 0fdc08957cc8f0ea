//! The "who is online" snapshot feed.

mod client;

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use client::HttpSnapshotFeed;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// One entry of the online roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OnlineCharacter {
    pub name: String,
    pub level: u32,
    #[serde(default)]
    pub vocation: String,
    #[serde(default)]
    pub country: String,
}

impl OnlineCharacter {
    pub fn new(name: &str, level: u32, vocation: &str, country: &str) -> Self {
        Self {
            name: name.to_string(),
            level,
            vocation: vocation.to_string(),
            country: country.to_string(),
        }
    }
}

/// The feed could not produce a snapshot. Never means "nobody is online".
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to build feed client: {0}")]
    Client(String),
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("feed returned status {0}")]
    Status(u16),
    #[error("failed to decode feed response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SnapshotFeed: Send + Sync {
    /// Current online roster. An `Ok` empty list means nobody is online.
    async fn fetch_online(&self) -> Result<Vec<OnlineCharacter>, FeedError>;
}

/// Drops repeated names, keeping the first occurrence and the feed's order.
pub fn dedup_by_name(players: Vec<OnlineCharacter>) -> Vec<OnlineCharacter> {
    let mut seen = HashSet::with_capacity(players.len());
    players
        .into_iter()
        .filter(|player| {
            let first = seen.insert(player.name.clone());
            if !first {
                log_warn!("Feed listed {} more than once, keeping the first entry", player.name);
            }
            first
        })
        .collect()
}
