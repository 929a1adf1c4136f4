//! Domain events reflecting pool state mutations.
//!
//! Every state change emits a [`LedgerEvent`] through the [`super::EventBus`].
//! Events are broadcast to WebSocket subscribers and optionally appended to
//! the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, Amount, PoolId};

/// Domain event emitted after every state mutation.
///
/// Amounts are string-encoded micro-units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Emitted when a new pool is created.
    PoolCreated {
        /// Pool identifier.
        pool_id: PoolId,
        /// Challenge name.
        name: String,
        /// Per-participant stake.
        stake_amount: Amount,
        /// Challenge length in days.
        duration_days: u64,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a participant's stake enters escrow.
    ParticipantJoined {
        /// Pool identifier.
        pool_id: PoolId,
        /// Joining address.
        participant: Address,
        /// Escrow balance after the join.
        escrow: Amount,
        /// Number of participants after the join.
        participant_count: u64,
        /// Join timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted the first time a call observes a pool that missed its
    /// minimum contributor count.
    PoolCanceled {
        /// Pool identifier.
        pool_id: PoolId,
        /// Participants at registration close.
        participant_count: u64,
        /// Required participants.
        min_contributors: u64,
        /// Observation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a daily proof is recorded.
    ProofSubmitted {
        /// Pool identifier.
        pool_id: PoolId,
        /// Submitting participant.
        participant: Address,
        /// Day index of the proof.
        day: u64,
        /// Opaque proof reference.
        proof_ref: String,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a peer vote is counted.
    VoteCast {
        /// Pool identifier.
        pool_id: PoolId,
        /// Voting participant.
        voter: Address,
        /// Participant whose proof was judged.
        target: Address,
        /// Day index of the judged proof.
        day: u64,
        /// Approval or rejection.
        approve: bool,
        /// Approvals after this vote.
        yes_votes: u64,
        /// Rejections after this vote.
        no_votes: u64,
        /// Verification outcome after this vote.
        is_verified: bool,
        /// Vote timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a day's tally is folded into participant progress.
    DayFinalized {
        /// Pool identifier.
        pool_id: PoolId,
        /// Finalized day index.
        day: u64,
        /// Participants whose proof for the day was verified.
        verified: Vec<Address>,
        /// Finalization timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted once when settlement runs.
    PoolSettled {
        /// Pool identifier.
        pool_id: PoolId,
        /// Reward paid to each qualifier on top of their stake.
        reward_per_winner: Amount,
        /// Number of qualifiers.
        qualifying_count: u64,
        /// Undistributed remainder.
        dust: Amount,
        /// Whether all stakes are simply refunded.
        refund_only: bool,
        /// Settlement timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a participant withdraws their entitlement.
    RewardWithdrawn {
        /// Pool identifier.
        pool_id: PoolId,
        /// Withdrawing participant.
        participant: Address,
        /// Amount paid out.
        amount: Amount,
        /// `true` when the payout is a stake refund of a canceled pool.
        refund: bool,
        /// Withdrawal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after the operator sweeps settlement dust.
    DustSwept {
        /// Pool identifier.
        pool_id: PoolId,
        /// Receiving operator account.
        operator: Address,
        /// Swept amount.
        amount: Amount,
        /// Sweep timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Returns the pool ID associated with this event.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        match self {
            Self::PoolCreated { pool_id, .. }
            | Self::ParticipantJoined { pool_id, .. }
            | Self::PoolCanceled { pool_id, .. }
            | Self::ProofSubmitted { pool_id, .. }
            | Self::VoteCast { pool_id, .. }
            | Self::DayFinalized { pool_id, .. }
            | Self::PoolSettled { pool_id, .. }
            | Self::RewardWithdrawn { pool_id, .. }
            | Self::DustSwept { pool_id, .. } => *pool_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PoolCreated { .. } => "pool_created",
            Self::ParticipantJoined { .. } => "participant_joined",
            Self::PoolCanceled { .. } => "pool_canceled",
            Self::ProofSubmitted { .. } => "proof_submitted",
            Self::VoteCast { .. } => "vote_cast",
            Self::DayFinalized { .. } => "day_finalized",
            Self::PoolSettled { .. } => "pool_settled",
            Self::RewardWithdrawn { .. } => "reward_withdrawn",
            Self::DustSwept { .. } => "dust_swept",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn pool_created_event_type() {
        let event = LedgerEvent::PoolCreated {
            pool_id: PoolId::new(0),
            name: "Daily Meditation".to_string(),
            stake_amount: Amount::new(10_000_000),
            duration_days: 30,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "pool_created");
    }

    #[test]
    fn vote_cast_serializes_with_tag() {
        let event = LedgerEvent::VoteCast {
            pool_id: PoolId::new(4),
            voter: Address::from_bytes([1u8; Address::LEN]),
            target: Address::from_bytes([2u8; Address::LEN]),
            day: 3,
            approve: true,
            yes_votes: 2,
            no_votes: 0,
            is_verified: true,
            timestamp: Utc::now(),
        };
        let json_str = serde_json::to_string(&event).unwrap_or_default();
        assert!(json_str.contains("\"event_type\":\"vote_cast\""));
        assert!(json_str.contains("\"pool_id\":4"));
        let Ok(back) = serde_json::from_str::<LedgerEvent>(&json_str) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, event);
    }

    #[test]
    fn pool_id_accessor() {
        let id = PoolId::new(9);
        let event = LedgerEvent::DustSwept {
            pool_id: id,
            operator: Address::ZERO,
            amount: Amount::new(1),
            timestamp: Utc::now(),
        };
        assert_eq!(event.pool_id(), id);
    }
}
