use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime, to_i64, to_u32},
    models::Actor,
};

const ACTOR_COLUMNS: &str = "id, name, level, vocation, country, created_at, updated_at";

pub(crate) fn row_to_actor(row: &Row) -> Result<Actor> {
    let level: i64 = row.get("level")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Actor {
        id: row.get("id")?,
        name: row.get("name")?,
        level: to_u32(level, "level")?,
        vocation: row.get("vocation")?,
        country: row.get("country")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

pub(crate) fn select_actor_by_name(conn: &Connection, name: &str) -> Result<Option<Actor>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACTOR_COLUMNS} FROM actors WHERE name = ?1"
    ))?;
    let mut rows = stmt.query(params![name])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_actor(row)?)),
        None => Ok(None),
    }
}

impl Database {
    /// Exact, case-sensitive lookup.
    pub async fn find_actor_by_name(&self, name: &str) -> Result<Option<Actor>> {
        let name = name.to_string();
        self.execute(move |conn| select_actor_by_name(conn, &name))
            .await
    }

    /// Returns the actor named `name`, creating it on first sight. Stats are only
    /// written when they differ from what is stored.
    pub async fn find_or_create_actor(
        &self,
        name: &str,
        level: u32,
        vocation: &str,
        country: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<Actor> {
        let name = name.to_string();
        let vocation = vocation.to_string();
        let country = country.to_string();
        self.execute(move |conn| {
            if let Some(mut actor) = select_actor_by_name(conn, &name)? {
                if actor.stats_differ(level, &vocation, &country) {
                    conn.execute(
                        "UPDATE actors
                         SET level = ?1,
                             vocation = ?2,
                             country = ?3,
                             updated_at = ?4
                         WHERE id = ?5",
                        params![
                            to_i64(level),
                            vocation,
                            country,
                            format_datetime(&seen_at),
                            actor.id
                        ],
                    )?;
                    actor.level = level;
                    actor.vocation = vocation;
                    actor.country = country;
                    actor.updated_at = seen_at;
                }
                return Ok(actor);
            }

            conn.execute(
                "INSERT INTO actors (name, level, vocation, country, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    name,
                    to_i64(level),
                    vocation,
                    country,
                    format_datetime(&seen_at),
                    format_datetime(&seen_at),
                ],
            )?;

            let actor_id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTOR_COLUMNS} FROM actors WHERE id = ?1"
            ))?;
            let actor = stmt
                .query_row(params![actor_id], |row| Ok(row_to_actor(row)))
                .optional()?
                .ok_or_else(|| anyhow!("actor not found after insert"))??;
            Ok(actor)
        })
        .await
    }

    pub async fn count_actors(&self) -> Result<i64> {
        self.execute(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM actors", [], |row| row.get(0))?)
        })
        .await
    }
}
