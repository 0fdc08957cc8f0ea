use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{dedup_by_name, FeedError, OnlineCharacter, SnapshotFeed};

const WHOS_ONLINE_PATH: &str = "whoisonline";

#[derive(Debug, Deserialize)]
struct WhosOnlineResponse {
    players: Vec<OnlineCharacter>,
}

/// Polls `GET {base_url}/whoisonline`, expecting `{"players": [...]}`.
#[derive(Debug, Clone)]
pub struct HttpSnapshotFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: whos_online_url(base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn whos_online_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), WHOS_ONLINE_PATH)
}

fn decode_players(body: &str) -> Result<Vec<OnlineCharacter>, FeedError> {
    let response: WhosOnlineResponse =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))?;
    Ok(dedup_by_name(response.players))
}

#[async_trait]
impl SnapshotFeed for HttpSnapshotFeed {
    async fn fetch_online(&self) -> Result<Vec<OnlineCharacter>, FeedError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        decode_players(&body)
    }
}
