//! Database models for pool snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Pool;
use crate::error::LedgerError;

/// A pool snapshot row from the `pool_snapshots` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Pool that was snapshotted.
    pub pool_id: i64,
    /// Full pool aggregate as JSONB.
    pub state_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}

impl PoolSnapshot {
    /// Rebuilds the pool aggregate stored in this snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceError`] on a malformed snapshot or
    /// when the stored id disagrees with the row's `pool_id`.
    pub fn into_pool(self) -> Result<Pool, LedgerError> {
        let pool: Pool = serde_json::from_value(self.state_json)
            .map_err(|e| LedgerError::PersistenceError(format!("snapshot {}: {e}", self.id)))?;
        if i64::try_from(pool.id().get()).ok() != Some(self.pool_id) {
            return Err(LedgerError::PersistenceError(format!(
                "snapshot {} holds pool {} but is filed under {}",
                self.id,
                pool.id(),
                self.pool_id
            )));
        }
        Ok(pool)
    }
}

/// Converts a pool id into the signed `BIGINT` column type.
///
/// # Errors
///
/// Returns [`LedgerError::PersistenceError`] for ids above `i64::MAX`.
pub fn pool_id_column(pool_id: crate::domain::PoolId) -> Result<i64, LedgerError> {
    i64::try_from(pool_id.get())
        .map_err(|_| LedgerError::PersistenceError(format!("pool id {pool_id} out of range")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Amount, PoolId, PoolParams};

    fn snapshot_of(pool: &Pool, filed_under: i64) -> PoolSnapshot {
        PoolSnapshot {
            id: 1,
            pool_id: filed_under,
            state_json: serde_json::to_value(pool).unwrap_or_default(),
            snapshot_at: Utc::now(),
        }
    }

    fn pool() -> Pool {
        let params = PoolParams {
            name: "Journal".to_string(),
            stake_amount: Amount::new(1_000_000),
            duration_days: 10,
            start_time: 200,
            registration_end_time: 100,
            min_contributors: 2,
            quorum_bps: 6_000,
            min_votes_required: 8,
        };
        let Ok(pool) = Pool::create(PoolId::new(12), params, 0) else {
            panic!("pool creation failed");
        };
        pool
    }

    #[test]
    fn snapshot_restores_pool() {
        let original = pool();
        let Ok(restored) = snapshot_of(&original, 12).into_pool() else {
            panic!("restore failed");
        };
        assert_eq!(restored, original);
    }

    #[test]
    fn mismatched_snapshot_is_rejected() {
        let result = snapshot_of(&pool(), 13).into_pool();
        assert!(matches!(result, Err(LedgerError::PersistenceError(_))));
    }
}
