//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{PoolSnapshot, pool_id_column};
use crate::config::LedgerConfig;
use crate::domain::{LedgerEvent, Pool};
use crate::error::LedgerError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

fn db_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::PersistenceError(e.to_string())
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by `config` and runs pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(db_err)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(db_err)?;
        Ok(Self::new(pool))
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure.
    pub async fn save_event(&self, event: &LedgerEvent) -> Result<i64, LedgerError> {
        let payload = serde_json::to_value(event).map_err(db_err)?;
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (pool_id, event_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(pool_id_column(event.pool_id())?)
        .bind(event.event_type_str())
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Saves a full pool snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure.
    pub async fn save_snapshot(&self, pool: &Pool) -> Result<i64, LedgerError> {
        let state_json = serde_json::to_value(pool).map_err(db_err)?;
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO pool_snapshots (pool_id, state_json) VALUES ($1, $2) RETURNING id",
        )
        .bind(pool_id_column(pool.id())?)
        .bind(state_json)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Loads the latest snapshot for each pool using `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<PoolSnapshot>, LedgerError> {
        let rows = sqlx::query_as::<_, (i64, i64, serde_json::Value, DateTime<Utc>)>(
            "SELECT DISTINCT ON (pool_id) id, pool_id, state_json, snapshot_at \
             FROM pool_snapshots ORDER BY pool_id, snapshot_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(id, pool_id, state_json, snapshot_at)| PoolSnapshot {
                id,
                pool_id,
                state_json,
                snapshot_at,
            })
            .collect())
    }

    /// Deletes snapshots older than the given number of days, always
    /// keeping the newest snapshot of every pool.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, LedgerError> {
        let cutoff = i64::try_from(before_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let result = sqlx::query(
            "DELETE FROM pool_snapshots s WHERE s.snapshot_at < $1 \
             AND s.id <> (SELECT MAX(id) FROM pool_snapshots WHERE pool_id = s.pool_id)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}
