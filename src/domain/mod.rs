//! Domain layer: value types, the pool aggregate, and the event system.
//!
//! Everything in here is synchronous and deterministic given an observed
//! time, except for the registry and the event bus which wrap tokio
//! primitives for shared access.

pub mod address;
pub mod amount;
pub mod clock;
pub mod custody;
pub mod event_bus;
pub mod pool;
pub mod pool_event;
pub mod pool_id;
pub mod pool_registry;
pub mod settlement;
pub mod tally;

pub use address::Address;
pub use amount::Amount;
pub use clock::{Clock, ManualClock, SystemClock};
pub use custody::{Custody, InMemoryCustody};
pub use event_bus::EventBus;
pub use pool::{
    Participant, Payout, Pool, PoolDetails, PoolParams, PoolPhase, PoolState, PoolSummary,
    SubmissionView,
};
pub use pool_event::LedgerEvent;
pub use pool_id::PoolId;
pub use pool_registry::PoolRegistry;
pub use settlement::Settlement;
