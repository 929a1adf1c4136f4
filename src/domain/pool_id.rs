//! Type-safe pool identifier.
//!
//! [`PoolId`] is a newtype wrapper around a sequential `u64` so that pool
//! identifiers cannot be confused with day indices, counts or amounts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a commitment pool.
///
/// Allocated sequentially by [`super::PoolRegistry`] starting at zero.
/// Identifiers are never reused, even across restarts (the registry resumes
/// after the highest restored id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(u64);

impl PoolId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PoolId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<PoolId> for u64 {
    fn from(id: PoolId) -> Self {
        id.0
    }
}
