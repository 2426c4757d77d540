//! SQLite-backed chat storage
//!
//! Two tables: `participants` (name → last seen) and `messages`, an
//! append-only log ordered by its autoincrement id.

use crate::core::error::{Error, Result};
use crate::core::models::{Message, Participant};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

/// Store client owning the connection pool
pub struct ChatStore {
    pool: SqlitePool,
}

impl ChatStore {
    /// Connect to `database_url` and make sure the schema exists
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database is a separate database,
        // so keep exactly one alive for the life of the pool.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.init_db().await?;

        info!("[Store] Connected to {}", database_url);
        Ok(store)
    }

    async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS participants (
                name TEXT PRIMARY KEY,
                last_seen INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                from_name TEXT NOT NULL,
                to_name TEXT NOT NULL,
                text TEXT NOT NULL,
                kind TEXT NOT NULL,
                time TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Release the pool. Further calls fail with a store error.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Drop the message log so every later append fails
    #[cfg(test)]
    pub(crate) async fn break_message_log(&self) {
        sqlx::query("DROP TABLE messages")
            .execute(&self.pool)
            .await
            .unwrap();
    }

    /// Insert a new participant. A taken name is a conflict.
    pub async fn insert_participant(&self, participant: &Participant) -> Result<()> {
        sqlx::query("INSERT INTO participants (name, last_seen) VALUES (?, ?)")
            .bind(&participant.name)
            .bind(participant.last_seen.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    Error::Conflict(participant.name.clone())
                }
                other => Error::Store(other),
            })?;
        Ok(())
    }

    pub async fn participant_exists(&self, name: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT name FROM participants WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Set `last_seen` for `name`. Returns false if no such participant.
    pub async fn touch_participant(&self, name: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query("UPDATE participants SET last_seen = ? WHERE name = ?")
            .bind(at.timestamp_millis())
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_participants(&self) -> Result<Vec<Participant>> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT name, last_seen FROM participants")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(participant_from_row).collect())
    }

    /// Participants whose `last_seen` is strictly before `cutoff`
    pub async fn stale_participants(&self, cutoff: DateTime<Utc>) -> Result<Vec<Participant>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, last_seen FROM participants WHERE last_seen < ?")
                .bind(cutoff.timestamp_millis())
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(participant_from_row).collect())
    }

    /// Remove `name` if it is still stale at `cutoff` and append `farewell`,
    /// both in one transaction.
    ///
    /// Returns false and appends nothing when the participant is gone or was
    /// heartbeated after the caller's scan.
    pub async fn evict_participant(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
        farewell: &Message,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM participants WHERE name = ? AND last_seen < ?")
            .bind(name)
            .bind(cutoff.timestamp_millis())
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            debug!("[Store] {} no longer stale, not evicted", name);
            return Ok(false);
        }

        insert_message(&mut *tx, farewell).await?;
        tx.commit().await?;
        Ok(true)
    }

    pub async fn append_message(&self, message: &Message) -> Result<()> {
        insert_message(&self.pool, message).await
    }

    /// Full message log in append order
    pub async fn list_messages(&self) -> Result<Vec<Message>> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT from_name, to_name, text, kind, time FROM messages ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(from, to, text, kind, time)| -> Result<Message> {
                let kind = kind
                    .parse()
                    .map_err(|e: String| Error::Store(sqlx::Error::Decode(e.into())))?;
                Ok(Message {
                    from,
                    to,
                    text,
                    kind,
                    time,
                })
            })
            .collect()
    }
}

async fn insert_message<'e, E>(executor: E, message: &Message) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO messages (from_name, to_name, text, kind, time) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&message.from)
    .bind(&message.to)
    .bind(&message.text)
    .bind(message.kind.as_str())
    .bind(&message.time)
    .execute(executor)
    .await?;
    Ok(())
}

fn participant_from_row((name, last_seen): (String, i64)) -> Participant {
    Participant {
        name,
        last_seen: DateTime::from_timestamp_millis(last_seen).unwrap_or_default(),
    }
}
