//! Database initialization and the Postgres session backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses `init_pool` to create the shared SQLx pool and enforce
//! schema migrations before accepting traffic. `PgSessionBackend` is the
//! production implementation of the session storage trait: every method
//! is one independent statement, so no operation holds locks across
//! requests and the sweep can run concurrently with validation.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;

use crate::services::session::{SessionBackend, SessionRecord, StorageError, env_parse};

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS))
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

/// Session storage on Postgres.
pub struct PgSessionBackend {
    pool: PgPool,
}

impl PgSessionBackend {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> SessionRecord {
    SessionRecord {
        token: row.get("token"),
        username: row.get("username"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    }
}

#[async_trait]
impl SessionBackend for PgSessionBackend {
    async fn insert(&self, record: SessionRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"INSERT INTO sessions (token, username, user_id, created_at, expires_at)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&record.token)
        .bind(&record.username)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch(&self, token: &str) -> Result<Option<SessionRecord>, StorageError> {
        let row = sqlx::query(
            r"SELECT token, username, user_id, created_at, expires_at
              FROM sessions
              WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    async fn remove(&self, token: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn sweep(&self, cutoff: OffsetDateTime) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
