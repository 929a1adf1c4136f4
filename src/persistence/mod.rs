//! Persistence layer: PostgreSQL event log and pool snapshots.
//!
//! The ledger runs in memory; when enabled, every mutated pool is written
//! through to `pool_snapshots` before the request returns, every published
//! event is appended to the `events` table, and a periodic task re-snapshots
//! all pools and prunes old rows. On startup the latest snapshot of each
//! pool is loaded back into the registry.

pub mod models;
pub mod postgres;
pub mod sink;
pub mod tasks;

pub use postgres::PostgresPersistence;
pub use sink::SnapshotSink;
