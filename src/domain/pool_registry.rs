//! Concurrent pool storage with per-pool fine-grained locking.
//!
//! [`PoolRegistry`] stores every pool in an ordered map where each entry is
//! individually protected by a [`tokio::sync::RwLock`]. This allows
//! concurrent reads on the same pool and concurrent writes on different
//! pools. Identifiers are allocated sequentially from zero.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::PoolId;
use super::pool::{Pool, PoolParams, PoolSummary};
use crate::error::LedgerError;

#[derive(Debug, Default)]
struct RegistryInner {
    pools: BTreeMap<PoolId, Arc<RwLock<Pool>>>,
    next_id: u64,
}

/// Central store for all pools.
///
/// Uses a `RwLock<BTreeMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<Pool>>` for fine-grained per-pool locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same pool concurrently.
/// - Writes to different pools are concurrent.
/// - Writes to the same pool are serialized.
/// - Id allocation happens under the outer write lock, so ids are unique
///   and dense.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    inner: RwLock<RegistryInner>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `params`, allocates the next id and stores a new pool.
    ///
    /// Returns a snapshot of the created pool. No id is consumed when
    /// validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPoolParameters`] on invalid parameters.
    pub async fn create(&self, params: PoolParams, now: i64) -> Result<Pool, LedgerError> {
        params.validate(now)?;
        let mut inner = self.inner.write().await;
        let pool_id = PoolId::new(inner.next_id);
        let pool = Pool::create(pool_id, params, now)?;
        inner
            .pools
            .insert(pool_id, Arc::new(RwLock::new(pool.clone())));
        inner.next_id = inner.next_id.saturating_add(1);
        Ok(pool)
    }

    /// Returns the pool behind its per-pool lock.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] if no pool with the given ID
    /// exists.
    pub async fn get(&self, pool_id: PoolId) -> Result<Arc<RwLock<Pool>>, LedgerError> {
        let inner = self.inner.read().await;
        inner
            .pools
            .get(&pool_id)
            .map(Arc::clone)
            .ok_or(LedgerError::PoolNotFound(pool_id))
    }

    /// Re-inserts a pool loaded from a snapshot, advancing the id counter
    /// past it. An existing pool with the same id is replaced.
    pub async fn restore(&self, pool: Pool) {
        let pool_id = pool.id();
        let mut inner = self.inner.write().await;
        inner.next_id = inner.next_id.max(pool_id.get().saturating_add(1));
        inner.pools.insert(pool_id, Arc::new(RwLock::new(pool)));
    }

    /// Returns summaries of all pools in id order, observed at `now`.
    pub async fn list(&self, now: i64) -> Vec<PoolSummary> {
        let inner = self.inner.read().await;
        let mut summaries = Vec::with_capacity(inner.pools.len());
        for pool_lock in inner.pools.values() {
            summaries.push(pool_lock.read().await.summary(now));
        }
        summaries
    }

    /// Returns a handle to every pool, in id order.
    pub async fn handles(&self) -> Vec<Arc<RwLock<Pool>>> {
        self.inner.read().await.pools.values().map(Arc::clone).collect()
    }

    /// Returns the number of pools ever created (equals the next id).
    pub async fn pool_count(&self) -> u64 {
        self.inner.read().await.next_id
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Amount;

    const NOW: i64 = 1_700_000_000;

    fn params(name: &str) -> PoolParams {
        PoolParams {
            name: name.to_string(),
            stake_amount: Amount::new(10_000_000),
            duration_days: 7,
            start_time: NOW + 3_600,
            registration_end_time: NOW + 3_600,
            min_contributors: 2,
            quorum_bps: 5_000,
            min_votes_required: 5,
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_from_zero() {
        let registry = PoolRegistry::new();
        let Ok(first) = registry.create(params("a"), NOW).await else {
            panic!("create failed");
        };
        let Ok(second) = registry.create(params("b"), NOW).await else {
            panic!("create failed");
        };
        assert_eq!(first.id(), PoolId::new(0));
        assert_eq!(second.id(), PoolId::new(1));
        assert_eq!(registry.pool_count().await, 2);
    }

    #[tokio::test]
    async fn invalid_params_do_not_consume_an_id() {
        let registry = PoolRegistry::new();
        let mut bad = params("bad");
        bad.duration_days = 0;
        assert!(registry.create(bad, NOW).await.is_err());
        assert_eq!(registry.pool_count().await, 0);
        assert!(registry.handles().await.is_empty());

        let Ok(pool) = registry.create(params("good"), NOW).await else {
            panic!("create failed");
        };
        assert_eq!(pool.id(), PoolId::new(0));
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = PoolRegistry::new();
        let result = registry.get(PoolId::new(3)).await;
        assert_eq!(result.err(), Some(LedgerError::PoolNotFound(PoolId::new(3))));
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let registry = PoolRegistry::new();
        for name in ["x", "y", "z"] {
            let _ = registry.create(params(name), NOW).await;
        }
        let names: Vec<String> = registry
            .list(NOW)
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn restore_advances_id_counter() {
        let registry = PoolRegistry::new();
        let Ok(pool) = Pool::create(PoolId::new(41), params("restored"), NOW) else {
            panic!("pool creation failed");
        };
        registry.restore(pool).await;
        assert!(registry.get(PoolId::new(41)).await.is_ok());
        let Ok(next) = registry.create(params("next"), NOW).await else {
            panic!("create failed");
        };
        assert_eq!(next.id(), PoolId::new(42));
        assert_eq!(registry.handles().await.len(), 2);
    }
}
