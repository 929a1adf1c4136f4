//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::LedgerService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ledger service for all business logic.
    pub ledger: Arc<LedgerService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Whether the custody faucet endpoint accepts deposits.
    pub faucet_enabled: bool,
}

impl AppState {
    /// Builds state around a ledger service, sharing its event bus.
    #[must_use]
    pub fn new(ledger: Arc<LedgerService>, faucet_enabled: bool) -> Self {
        let event_bus = ledger.event_bus().clone();
        Self {
            ledger,
            event_bus,
            faucet_enabled,
        }
    }
}
