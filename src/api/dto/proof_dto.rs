//! DTOs for daily proofs and peer votes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SubmissionView;

/// Request body for `POST /pools/{id}/proofs`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitProofRequest {
    /// Submitting participant.
    pub caller: String,
    /// Opaque proof reference (URL, content hash).
    pub proof_ref: String,
}

/// Request body for `POST /pools/{id}/votes`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    /// Voting participant.
    pub caller: String,
    /// Day index of the judged proof.
    pub day: u64,
    /// Participant whose proof is judged.
    pub target: String,
    /// `true` to approve, `false` to reject.
    pub approve: bool,
}

/// A submission with its tally, returned by proof, vote and lookup
/// endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionResponse {
    /// Pool identifier.
    pub pool_id: u64,
    /// Day index.
    pub day: u64,
    /// Submitting participant.
    pub user: String,
    /// Opaque proof reference.
    pub proof_ref: String,
    /// Unix time of submission.
    pub timestamp: i64,
    /// Approvals.
    pub yes_votes: u64,
    /// Rejections.
    pub no_votes: u64,
    /// Quorum reached and approvals outnumber rejections.
    pub is_verified: bool,
}

impl SubmissionResponse {
    /// Builds the response from a submission view.
    #[must_use]
    pub fn new(pool_id: u64, day: u64, user: String, view: SubmissionView) -> Self {
        Self {
            pool_id,
            day,
            user,
            proof_ref: view.proof_ref,
            timestamp: view.timestamp,
            yes_votes: view.yes_votes,
            no_votes: view.no_votes,
            is_verified: view.is_verified,
        }
    }
}
