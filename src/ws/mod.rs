//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams ledger events for subscribed
//! pools and answers `get_state` queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
