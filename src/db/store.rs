use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    connection::Database,
    models::{Actor, ActorHistory, Session},
};

/// Interval storage consumed by the presence poller and the correlation scanner.
///
/// Each call is atomic on its own; nothing spans calls, so a find-then-close pair
/// issued by two writers for the same actor may race.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_actor_by_name(&self, name: &str) -> Result<Option<Actor>>;

    async fn find_or_create_actor(
        &self,
        name: &str,
        level: u32,
        vocation: &str,
        country: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<Actor>;

    async fn find_active_session(&self, actor_id: i64) -> Result<Option<Session>>;

    async fn create_session(&self, actor_id: i64, login_at: DateTime<Utc>) -> Result<Session>;

    /// `Ok(false)` when there was no open session with that id.
    async fn close_session(&self, session_id: i64, logout_at: DateTime<Utc>) -> Result<bool>;

    async fn list_sessions_by_actor(&self, actor_id: i64) -> Result<Vec<Session>>;

    async fn list_sessions_by_name(&self, name: &str) -> Result<Vec<Session>>;

    async fn list_candidate_histories(&self, excluded_actor_id: i64) -> Result<Vec<ActorHistory>>;
}

#[async_trait]
impl SessionStore for Database {
    async fn find_actor_by_name(&self, name: &str) -> Result<Option<Actor>> {
        Database::find_actor_by_name(self, name).await
    }

    async fn find_or_create_actor(
        &self,
        name: &str,
        level: u32,
        vocation: &str,
        country: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<Actor> {
        Database::find_or_create_actor(self, name, level, vocation, country, seen_at).await
    }

    async fn find_active_session(&self, actor_id: i64) -> Result<Option<Session>> {
        Database::find_active_session(self, actor_id).await
    }

    async fn create_session(&self, actor_id: i64, login_at: DateTime<Utc>) -> Result<Session> {
        Database::create_session(self, actor_id, login_at).await
    }

    async fn close_session(&self, session_id: i64, logout_at: DateTime<Utc>) -> Result<bool> {
        Database::close_session(self, session_id, logout_at).await
    }

    async fn list_sessions_by_actor(&self, actor_id: i64) -> Result<Vec<Session>> {
        Database::list_sessions_by_actor(self, actor_id).await
    }

    async fn list_sessions_by_name(&self, name: &str) -> Result<Vec<Session>> {
        Database::list_sessions_by_name(self, name).await
    }

    async fn list_candidate_histories(&self, excluded_actor_id: i64) -> Result<Vec<ActorHistory>> {
        Database::list_candidate_histories(self, excluded_actor_id).await
    }
}
