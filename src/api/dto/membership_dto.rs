//! DTOs for joining pools and reading participant progress.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Address, Participant, PoolId, PoolState};

/// Response body for `POST /pools/{id}/join`.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Joined address.
    pub participant: String,
    /// Escrowed balance after the join, in micro-units.
    pub escrow: String,
    /// Participant count after the join.
    pub participant_count: u64,
}

impl JoinResponse {
    /// Builds the response from the post-join pool state.
    #[must_use]
    pub fn new(participant: Address, state: &PoolState) -> Self {
        Self {
            pool_id: state.pool_id.get(),
            participant: participant.to_string(),
            escrow: state.escrow.to_string(),
            participant_count: state.participant_count,
        }
    }
}

/// Response body for `GET /pools/{id}/users/{user}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProgressResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Queried address.
    pub user: String,
    /// Whether the address joined.
    pub has_joined: bool,
    /// Finalized days whose proof reached quorum.
    pub verified_days: u64,
    /// Votes cast on others' proofs.
    pub votes_cast: u64,
    /// Whether the entitlement was withdrawn.
    pub withdrawn: bool,
}

impl UserProgressResponse {
    /// Builds the response from a participant record.
    #[must_use]
    pub fn new(pool_id: PoolId, user: Address, p: Participant) -> Self {
        Self {
            pool_id: pool_id.get(),
            user: user.to_string(),
            has_joined: p.has_joined,
            verified_days: p.verified_days,
            votes_cast: p.votes_cast,
            withdrawn: p.withdrawn,
        }
    }
}
