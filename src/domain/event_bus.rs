//! Fan-out of ledger events.
//!
//! The service publishes the events of a mutation only after the pool lock
//! is released. Receivers that fall more than `capacity` events behind
//! observe `RecvError::Lagged` and skip ahead.

use tokio::sync::broadcast;

use super::LedgerEvent;

/// Cloneable handle to the ledger's broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    /// Opens a channel buffering up to `capacity` events (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends one event; returns how many receivers got it (0 when nobody
    /// listens).
    pub fn publish(&self, event: LedgerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Sends the events of one mutation in emission order.
    ///
    /// Returns the number of events that reached at least one receiver.
    pub fn publish_all(&self, events: impl IntoIterator<Item = LedgerEvent>) -> usize {
        events
            .into_iter()
            .filter(|event| self.sender.send(event.clone()).is_ok())
            .count()
    }

    /// New receiver that sees every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    /// Live receivers: WebSocket connections plus the event-log writer.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
