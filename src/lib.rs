//! # commitment-pool-ledger
//!
//! REST API and WebSocket service for commitment pools: participants stake
//! a fixed amount, submit one proof per day, verify each other's proofs by
//! quorum vote and split the forfeited stakes of those who fell short.
//!
//! The ledger itself is pure in-memory state guarded per pool; tokens move
//! only through the [`domain::Custody`] seam and time is read only through
//! [`domain::Clock`], so the whole lifecycle can be driven from tests.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── LedgerService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── PoolRegistry ── Pool aggregates (domain/)
//!     ├── Custody, Clock (domain/)
//!     │
//!     └── PostgreSQL Persistence (event log + snapshots)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
