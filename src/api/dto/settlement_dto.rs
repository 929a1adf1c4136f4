//! DTOs for settlement, withdrawal and dust sweep.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{PoolId, Settlement};

/// Response body for `POST /pools/{id}/settle`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SettlementResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Reward per qualifier on top of their stake, in micro-units.
    pub reward_per_winner: String,
    /// Number of qualifiers.
    pub qualifying_count: u64,
    /// Total stake forfeited by non-qualifiers.
    pub forfeited: String,
    /// Undistributable remainder kept for the operator sweep.
    pub dust: String,
    /// `true` when nobody qualified and every stake is refunded.
    pub refund_only: bool,
}

impl SettlementResponse {
    /// Builds the response from a settlement record.
    #[must_use]
    pub fn new(pool_id: PoolId, s: &Settlement) -> Self {
        Self {
            pool_id: pool_id.get(),
            reward_per_winner: s.reward_per_winner.to_string(),
            qualifying_count: s.qualifying_count,
            forfeited: s.forfeited.to_string(),
            dust: s.dust.to_string(),
            refund_only: s.refund_only,
        }
    }
}

/// Response body for `POST /pools/{id}/withdraw`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WithdrawResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Withdrawing participant.
    pub participant: String,
    /// Amount credited, in micro-units (may be zero).
    pub amount: String,
    /// `true` when the payout only returns the stake.
    pub refund: bool,
}

/// Response body for `POST /pools/{id}/sweep-dust`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepDustResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Receiving operator account.
    pub operator: String,
    /// Swept amount in micro-units.
    pub amount: String,
}
