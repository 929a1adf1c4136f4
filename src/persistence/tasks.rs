//! Background persistence tasks: event-log writer, periodic snapshots and
//! startup restore.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use super::postgres::PostgresPersistence;
use crate::domain::{EventBus, PoolRegistry};
use crate::error::LedgerError;

/// Spawns a task that appends every published event to the event log.
///
/// The writer stops when the bus closes. Lagged events are reported but
/// cannot be recovered; snapshots remain the source of truth on restart.
pub fn spawn_event_log_writer(store: PostgresPersistence, bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = store.save_event(&event).await {
                        tracing::error!(
                            pool_id = %event.pool_id(),
                            event_type = event.event_type_str(),
                            error = %e,
                            "failed to append event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event log writer lagged behind event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("event log writer stopped");
    })
}

/// Writes one snapshot per pool currently in the registry.
///
/// Returns the number of snapshots written; failures are logged and
/// skipped.
pub async fn snapshot_all(store: &PostgresPersistence, registry: &PoolRegistry) -> usize {
    let mut written = 0;
    for handle in registry.handles().await {
        // Read lock held until the row is written.
        let pool = handle.read().await;
        match store.save_snapshot(&pool).await {
            Ok(_) => written += 1,
            Err(e) => tracing::error!(pool_id = %pool.id(), error = %e, "snapshot failed"),
        }
    }
    written
}

/// Spawns the periodic snapshot loop.
///
/// Every `every` it snapshots all pools and, when `cleanup_after_days` is
/// non-zero, prunes snapshots older than that.
pub fn spawn_snapshot_task(
    store: PostgresPersistence,
    registry: Arc<PoolRegistry>,
    every: Duration,
    cleanup_after_days: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(every.max(Duration::from_secs(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        timer.tick().await;
        loop {
            timer.tick().await;
            let written = snapshot_all(&store, &registry).await;
            tracing::debug!(written, "pool snapshots written");

            if cleanup_after_days > 0 {
                match store.delete_old_snapshots(cleanup_after_days).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!(deleted, "old snapshots pruned"),
                    Err(e) => tracing::error!(error = %e, "snapshot cleanup failed"),
                }
            }
        }
    })
}

/// Loads the latest snapshot of every pool into the registry.
///
/// # Errors
///
/// Returns [`LedgerError::PersistenceError`] if snapshots cannot be read.
/// Individual malformed snapshots are logged and skipped.
pub async fn restore_registry(
    store: &PostgresPersistence,
    registry: &PoolRegistry,
) -> Result<usize, LedgerError> {
    let mut restored = 0;
    for snapshot in store.load_latest_snapshots().await? {
        let row_id = snapshot.id;
        match snapshot.into_pool() {
            Ok(pool) => {
                registry.restore(pool).await;
                restored += 1;
            }
            Err(e) => tracing::warn!(snapshot_id = row_id, error = %e, "skipping snapshot"),
        }
    }
    tracing::info!(restored, "registry restored from snapshots");
    Ok(restored)
}
