//! Service layer: business logic orchestration.
//!
//! [`LedgerService`] coordinates pool operations with custody, reads time
//! through the clock seam, and emits events through the
//! [`super::domain::EventBus`].

pub mod ledger_service;

pub use ledger_service::LedgerService;
