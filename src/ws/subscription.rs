//! Per-connection pool filter.
//!
//! A client narrows the event stream with `subscribe`/`unsubscribe`
//! commands whose `pool_ids` mix numeric ids, numeric strings and the
//! `"*"` wildcard. Entries that name no pool are ignored.

use std::collections::BTreeSet;

use super::messages::PoolSelector;
use crate::domain::{LedgerEvent, PoolId};

/// Pools a single WebSocket connection wants events for.
#[derive(Debug, Default)]
pub struct PoolFilter {
    pools: BTreeSet<PoolId>,
    wildcard: bool,
}

impl PoolFilter {
    /// Creates a filter that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the selected pools; `"*"` turns on the wildcard.
    ///
    /// Returns the ids that were not already selected.
    pub fn subscribe(&mut self, selectors: &[PoolSelector]) -> Vec<PoolId> {
        if selectors.iter().any(PoolSelector::is_wildcard) {
            self.wildcard = true;
        }
        selectors
            .iter()
            .filter_map(PoolSelector::pool_id)
            .filter(|id| self.pools.insert(*id))
            .collect()
    }

    /// Removes the selected pools; `"*"` turns off the wildcard but keeps
    /// explicit ids.
    ///
    /// Returns the ids that were actually removed.
    pub fn unsubscribe(&mut self, selectors: &[PoolSelector]) -> Vec<PoolId> {
        if selectors.iter().any(PoolSelector::is_wildcard) {
            self.wildcard = false;
        }
        selectors
            .iter()
            .filter_map(PoolSelector::pool_id)
            .filter(|id| self.pools.remove(id))
            .collect()
    }

    /// Whether `event` should be forwarded to this connection.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.wildcard || self.pools.contains(&event.pool_id())
    }

    /// Number of explicitly selected pools.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pools.len()
    }

    /// Whether the wildcard is on.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}
