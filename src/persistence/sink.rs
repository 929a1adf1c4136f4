//! Write-through snapshot seam.
//!
//! The service hands every pool it mutates to a [`SnapshotSink`] while it
//! still holds that pool's write lock, so the stored snapshot never lags an
//! acknowledged request.

use std::fmt;

use futures_util::future::BoxFuture;

use super::postgres::PostgresPersistence;
use crate::domain::Pool;
use crate::error::LedgerError;

/// Durable store for the latest state of a pool.
pub trait SnapshotSink: Send + Sync + fmt::Debug {
    /// Stores `pool` as its newest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PersistenceError`] when the write fails.
    fn save<'a>(&'a self, pool: &'a Pool) -> BoxFuture<'a, Result<(), LedgerError>>;
}

impl SnapshotSink for PostgresPersistence {
    fn save<'a>(&'a self, pool: &'a Pool) -> BoxFuture<'a, Result<(), LedgerError>> {
        Box::pin(async move { self.save_snapshot(pool).await.map(|_| ()) })
    }
}
