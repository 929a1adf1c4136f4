//! Pool-related DTOs for create, get, state and list operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::{PaginationMeta, parse_amount};
use crate::domain::{PoolDetails, PoolParams, PoolState, PoolSummary};
use crate::error::LedgerError;

/// Request body for `POST /pools`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePoolRequest {
    /// Challenge name (1-100 chars).
    pub name: String,
    /// Per-participant stake in micro-units, as a decimal string.
    pub stake_amount: String,
    /// Number of challenge days.
    pub duration_days: u64,
    /// Unix time of day 0.
    pub start_time: i64,
    /// Last unix second at which joining is allowed.
    pub registration_end_time: i64,
    /// Participants required at registration close.
    pub min_contributors: u64,
    /// Approval quorum in basis points (1-10000).
    pub quorum_bps: u16,
    /// Verified days needed to qualify for rewards.
    pub min_votes_required: u64,
}

impl CreatePoolRequest {
    /// Converts the request into domain parameters.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] if `stake_amount` is not a
    /// decimal integer.
    pub fn into_params(self) -> Result<PoolParams, LedgerError> {
        Ok(PoolParams {
            stake_amount: parse_amount("stake_amount", &self.stake_amount)?,
            name: self.name,
            duration_days: self.duration_days,
            start_time: self.start_time,
            registration_end_time: self.registration_end_time,
            min_contributors: self.min_contributors,
            quorum_bps: self.quorum_bps,
            min_votes_required: self.min_votes_required,
        })
    }
}

/// Pool facts for `POST /pools` and `GET /pools/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolDetailsResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Challenge name.
    pub name: String,
    /// Per-participant stake in micro-units.
    pub stake_amount: String,
    /// Number of challenge days.
    pub duration_days: u64,
    /// Unix time of day 0.
    pub start_time: i64,
    /// Registration deadline.
    pub registration_end_time: i64,
    /// Participants required at registration close.
    pub min_contributors: u64,
    /// Approval quorum in basis points.
    pub quorum_bps: u16,
    /// Verified days needed to qualify.
    pub min_votes_required: u64,
    /// Current participant count.
    pub participant_count: u64,
    /// Whether settlement ran.
    pub settled: bool,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl From<PoolDetails> for PoolDetailsResponse {
    fn from(d: PoolDetails) -> Self {
        Self {
            pool_id: d.pool_id.get(),
            name: d.params.name,
            stake_amount: d.params.stake_amount.to_string(),
            duration_days: d.params.duration_days,
            start_time: d.params.start_time,
            registration_end_time: d.params.registration_end_time,
            min_contributors: d.params.min_contributors,
            quorum_bps: d.params.quorum_bps,
            min_votes_required: d.params.min_votes_required,
            participant_count: d.participant_count,
            settled: d.settled,
            created_at: crate::domain::clock::ledger_time(d.created_at).to_rfc3339(),
        }
    }
}

/// Economic state for `GET /pools/{id}/state`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolStateResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Lifecycle phase (`registration`, `active`, `settleable`, `settled`,
    /// `canceled`).
    pub phase: String,
    /// Whether settlement ran.
    pub settled: bool,
    /// Whether the pool is canceled.
    pub canceled: bool,
    /// Every participant is owed exactly their stake back.
    pub refund_state: bool,
    /// Reward per qualifier in micro-units.
    pub reward_per_winner: String,
    /// Current participant count.
    pub participant_count: u64,
    /// Number of qualifiers after settlement.
    pub qualifying_count: u64,
    /// Escrowed balance in micro-units.
    pub escrow: String,
    /// Unswept settlement remainder in micro-units.
    pub dust: String,
    /// Whether the dust was swept.
    pub dust_swept: bool,
    /// Current day index, absent before the start.
    pub current_day: Option<u64>,
    /// Days folded into participant progress.
    pub finalized_days: u64,
}

impl From<PoolState> for PoolStateResponse {
    fn from(s: PoolState) -> Self {
        Self {
            pool_id: s.pool_id.get(),
            phase: s.phase.as_str().to_string(),
            settled: s.settled,
            canceled: s.canceled,
            refund_state: s.refund_state,
            reward_per_winner: s.reward_per_winner.to_string(),
            participant_count: s.participant_count,
            qualifying_count: s.qualifying_count,
            escrow: s.escrow.to_string(),
            dust: s.dust.to_string(),
            dust_swept: s.dust_swept,
            current_day: s.current_day,
            finalized_days: s.finalized_days,
        }
    }
}

/// Pool summary for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolSummaryDto {
    /// Pool identifier.
    pub pool_id: u64,
    /// Challenge name.
    pub name: String,
    /// Per-participant stake in micro-units.
    pub stake_amount: String,
    /// Number of challenge days.
    pub duration_days: u64,
    /// Current participant count.
    pub participant_count: u64,
    /// Lifecycle phase.
    pub phase: String,
}

impl From<PoolSummary> for PoolSummaryDto {
    fn from(s: PoolSummary) -> Self {
        Self {
            pool_id: s.pool_id.get(),
            name: s.name,
            stake_amount: s.stake_amount.to_string(),
            duration_days: s.duration_days,
            participant_count: s.participant_count,
            phase: s.phase.as_str().to_string(),
        }
    }
}

/// Paginated list response for `GET /pools`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Pool summaries.
    pub data: Vec<PoolSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response for `GET /pools/count`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolCountResponse {
    /// Number of pool ids allocated so far.
    pub count: u64,
}

/// Response for `GET /pools/{id}/participants`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantsResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Participant addresses in join order.
    pub participants: Vec<String>,
}
