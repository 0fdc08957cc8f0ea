use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime, parse_optional_datetime},
    models::{ActorHistory, Session},
};

use super::actors::{row_to_actor, select_actor_by_name};

fn row_to_session(row: &Row) -> Result<Session> {
    let login_at: String = row.get("login_at")?;
    let logout_at: Option<String> = row.get("logout_at")?;

    Ok(Session {
        id: row.get("id")?,
        actor_id: row.get("actor_id")?,
        login_at: parse_datetime(&login_at, "login_at")?,
        logout_at: parse_optional_datetime(logout_at, "logout_at")?,
    })
}

fn select_sessions_for_actor(conn: &rusqlite::Connection, actor_id: i64) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(
        "SELECT id, actor_id, login_at, logout_at
         FROM sessions
         WHERE actor_id = ?1
         ORDER BY login_at ASC",
    )?;

    let mut rows = stmt.query(params![actor_id])?;
    let mut sessions = Vec::new();
    while let Some(row) = rows.next()? {
        sessions.push(row_to_session(row)?);
    }
    Ok(sessions)
}

impl Database {
    pub async fn find_active_session(&self, actor_id: i64) -> Result<Option<Session>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, actor_id, login_at, logout_at
                 FROM sessions
                 WHERE actor_id = ?1 AND logout_at IS NULL
                 ORDER BY login_at DESC
                 LIMIT 1",
            )?;

            let mut rows = stmt.query(params![actor_id])?;
            let session = match rows.next()? {
                Some(row) => Some(row_to_session(row)?),
                None => None,
            };
            Ok(session)
        })
        .await
    }

    pub async fn create_session(&self, actor_id: i64, login_at: DateTime<Utc>) -> Result<Session> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (actor_id, login_at, logout_at) VALUES (?1, ?2, NULL)",
                params![actor_id, format_datetime(&login_at)],
            )?;
            Ok(Session {
                id: conn.last_insert_rowid(),
                actor_id,
                login_at,
                logout_at: None,
            })
        })
        .await
    }

    /// Sets `logout_at` on a still-open session. Returns `false` when the row is
    /// missing or already closed.
    pub async fn close_session(&self, session_id: i64, logout_at: DateTime<Utc>) -> Result<bool> {
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE sessions
                 SET logout_at = ?1
                 WHERE id = ?2 AND logout_at IS NULL",
                params![format_datetime(&logout_at), session_id],
            )?;
            Ok(rows_affected > 0)
        })
        .await
    }

    /// Full history for one actor, oldest first.
    pub async fn list_sessions_by_actor(&self, actor_id: i64) -> Result<Vec<Session>> {
        self.execute(move |conn| select_sessions_for_actor(conn, actor_id))
            .await
    }

    /// Full history for the actor named `name`; empty when the name was never seen.
    pub async fn list_sessions_by_name(&self, name: &str) -> Result<Vec<Session>> {
        let name = name.to_string();
        self.execute(move |conn| match select_actor_by_name(conn, &name)? {
            Some(actor) => select_sessions_for_actor(conn, actor.id),
            None => Ok(Vec::new()),
        })
        .await
    }

    /// Every actor other than `excluded_actor_id` that has at least one session,
    /// each with its complete history.
    pub async fn list_candidate_histories(&self, excluded_actor_id: i64) -> Result<Vec<ActorHistory>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.name, a.level, a.vocation, a.country, a.created_at, a.updated_at,
                        s.id AS session_id, s.login_at, s.logout_at
                 FROM sessions s
                 JOIN actors a ON a.id = s.actor_id
                 WHERE s.actor_id != ?1
                 ORDER BY a.id ASC, s.login_at ASC",
            )?;

            let mut histories: BTreeMap<i64, ActorHistory> = BTreeMap::new();
            let mut rows = stmt.query(params![excluded_actor_id])?;
            while let Some(row) = rows.next()? {
                let actor_id: i64 = row.get("id")?;
                let login_at: String = row.get("login_at")?;
                let logout_at: Option<String> = row.get("logout_at")?;
                let session = Session {
                    id: row.get("session_id")?,
                    actor_id,
                    login_at: parse_datetime(&login_at, "login_at")?,
                    logout_at: parse_optional_datetime(logout_at, "logout_at")?,
                };

                match histories.get_mut(&actor_id) {
                    Some(history) => history.sessions.push(session),
                    None => {
                        histories.insert(
                            actor_id,
                            ActorHistory {
                                actor: row_to_actor(row)?,
                                sessions: vec![session],
                            },
                        );
                    }
                }
            }

            Ok(histories.into_values().collect())
        })
        .await
    }

    pub async fn count_open_sessions(&self) -> Result<i64> {
        self.execute(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM sessions WHERE logout_at IS NULL",
                [],
                |row| row.get(0),
            )?)
        })
        .await
    }
}
