//! Ledger error types with HTTP status code mapping.
//!
//! [`LedgerError`] is the central error type for the ledger. Every failed
//! operation returns exactly one variant and leaves pool state untouched.
//! Each variant belongs to an [`ErrorCategory`], carries a stable numeric
//! code and maps to an HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Amount, PoolId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "category": "window",
///     "message": "registration window closed for pool 3"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`LedgerError`]).
    pub code: u32,
    /// Failure category.
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
}

/// Failure taxonomy shared by every ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad parameters, rejected before any state change.
    Validation,
    /// Time window violation (registration, proof, voting).
    Window,
    /// Caller is not allowed to perform the operation.
    Authorization,
    /// Operation invalid for the pool's current phase.
    State,
    /// The custody collaborator could not move funds.
    InsufficientFunds,
    /// Referenced record does not exist.
    NotFound,
    /// Adapter-side failure (persistence, internal invariants).
    Server,
}

/// Ledger error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2999 | Window            | 409 Conflict                 |
/// | 3000–3999 | Authorization     | 403 Forbidden                |
/// | 4000–4999 | State             | 409 Conflict                 |
/// | 5000–5999 | InsufficientFunds | 422 Unprocessable Entity     |
/// | 6000–6999 | NotFound          | 404 Not Found                |
/// | 9000–9999 | Server            | 500 Internal Server Error    |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Pool creation parameters violate an invariant.
    #[error("invalid pool parameters: {0}")]
    InvalidPoolParameters(String),

    /// Proof reference was empty.
    #[error("proof reference must not be empty")]
    InvalidProofRef,

    /// An address string could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Request body or path was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Join attempted after the registration window closed.
    #[error("registration window closed for pool {0}")]
    RegistrationClosed(PoolId),

    /// Proof submitted outside the pool's active days.
    #[error("proof window closed for pool {0}")]
    ProofWindowClosed(PoolId),

    /// Vote targets a day that has not started yet.
    #[error("day {day} has not started")]
    FutureDay {
        /// Requested day index.
        day: u64,
    },

    /// Vote targets a day past the end of the pool.
    #[error("voting closed for day {day}")]
    VotingClosed {
        /// Requested day index.
        day: u64,
    },

    /// Caller has not joined the pool.
    #[error("caller has not joined pool {0}")]
    NotJoined(PoolId),

    /// Participant tried to vote on their own submission.
    #[error("participants cannot vote on their own proof")]
    SelfVote,

    /// Caller already joined the pool.
    #[error("caller already joined pool {0}")]
    AlreadyJoined(PoolId),

    /// Submission for the day already received votes.
    #[error("proof for day {day} already submitted and voted on")]
    DuplicateSubmission {
        /// Day index of the existing submission.
        day: u64,
    },

    /// Voter already voted on this submission.
    #[error("vote already cast for day {day}")]
    DuplicateVote {
        /// Day index of the submission.
        day: u64,
    },

    /// Caller lacks the role required for the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The development faucet is not enabled.
    #[error("custody faucet is disabled")]
    FaucetDisabled,

    /// Pool is canceled or settled; proofs and votes are rejected.
    #[error("pool {0} is not active")]
    PoolInactive(PoolId),

    /// Pool was canceled for lack of contributors.
    #[error("pool {0} was canceled")]
    PoolCanceled(PoolId),

    /// Settlement already ran for this pool.
    #[error("pool {0} is already settled")]
    AlreadySettled(PoolId),

    /// Pool duration has not elapsed yet.
    #[error("pool {0} is not settleable yet")]
    NotSettleable(PoolId),

    /// Withdrawal or sweep attempted before settlement.
    #[error("pool {0} is not settled")]
    NotSettled(PoolId),

    /// Participant already withdrew.
    #[error("reward already withdrawn from pool {0}")]
    AlreadyWithdrawn(PoolId),

    /// No dust remains to sweep.
    #[error("pool {0} has no dust to sweep")]
    NoDust(PoolId),

    /// Vote target has no submission for the day.
    #[error("no submission for day {day}")]
    NoSubmission {
        /// Requested day index.
        day: u64,
    },

    /// Custody could not debit the stake.
    #[error("insufficient stake: required {required}, available {available}")]
    InsufficientStake {
        /// Amount the operation needed.
        required: Amount,
        /// Amount held by the account.
        available: Amount,
    },

    /// Pool with the given ID was not found.
    #[error("pool not found: {0}")]
    PoolNotFound(PoolId),

    /// Submission lookup found nothing.
    #[error("submission not found for day {day}")]
    SubmissionNotFound {
        /// Requested day index.
        day: u64,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal invariant failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the failure category for this variant.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPoolParameters(_)
            | Self::InvalidProofRef
            | Self::InvalidAddress(_)
            | Self::InvalidRequest(_) => ErrorCategory::Validation,
            Self::RegistrationClosed(_)
            | Self::ProofWindowClosed(_)
            | Self::FutureDay { .. }
            | Self::VotingClosed { .. } => ErrorCategory::Window,
            Self::NotJoined(_)
            | Self::SelfVote
            | Self::AlreadyJoined(_)
            | Self::DuplicateSubmission { .. }
            | Self::DuplicateVote { .. }
            | Self::Unauthorized(_)
            | Self::FaucetDisabled => ErrorCategory::Authorization,
            Self::PoolInactive(_)
            | Self::PoolCanceled(_)
            | Self::AlreadySettled(_)
            | Self::NotSettleable(_)
            | Self::NotSettled(_)
            | Self::AlreadyWithdrawn(_)
            | Self::NoDust(_)
            | Self::NoSubmission { .. } => ErrorCategory::State,
            Self::InsufficientStake { .. } => ErrorCategory::InsufficientFunds,
            Self::PoolNotFound(_) | Self::SubmissionNotFound { .. } => ErrorCategory::NotFound,
            Self::PersistenceError(_) | Self::Internal(_) => ErrorCategory::Server,
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidPoolParameters(_) => 1001,
            Self::InvalidProofRef => 1002,
            Self::InvalidAddress(_) => 1003,
            Self::InvalidRequest(_) => 1004,
            Self::RegistrationClosed(_) => 2001,
            Self::ProofWindowClosed(_) => 2002,
            Self::FutureDay { .. } => 2003,
            Self::VotingClosed { .. } => 2004,
            Self::NotJoined(_) => 3001,
            Self::SelfVote => 3002,
            Self::AlreadyJoined(_) => 3003,
            Self::DuplicateSubmission { .. } => 3004,
            Self::DuplicateVote { .. } => 3005,
            Self::Unauthorized(_) => 3006,
            Self::FaucetDisabled => 3007,
            Self::PoolInactive(_) => 4001,
            Self::PoolCanceled(_) => 4002,
            Self::AlreadySettled(_) => 4003,
            Self::NotSettleable(_) => 4004,
            Self::NotSettled(_) => 4005,
            Self::AlreadyWithdrawn(_) => 4006,
            Self::NoDust(_) => 4007,
            Self::NoSubmission { .. } => 4008,
            Self::InsufficientStake { .. } => 5001,
            Self::PoolNotFound(_) => 6001,
            Self::SubmissionNotFound { .. } => 6002,
            Self::Internal(_) => 9000,
            Self::PersistenceError(_) => 9001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Window | ErrorCategory::State => StatusCode::CONFLICT,
            ErrorCategory::Authorization => StatusCode::FORBIDDEN,
            ErrorCategory::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                category: self.category(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn codes_fall_in_category_ranges() {
        let cases = [
            LedgerError::InvalidProofRef,
            LedgerError::RegistrationClosed(PoolId::new(0)),
            LedgerError::SelfVote,
            LedgerError::AlreadySettled(PoolId::new(0)),
            LedgerError::InsufficientStake {
                required: Amount::new(10),
                available: Amount::ZERO,
            },
            LedgerError::PoolNotFound(PoolId::new(7)),
            LedgerError::Internal("x".to_string()),
        ];
        for err in cases {
            let range = match err.category() {
                ErrorCategory::Validation => 1000..2000,
                ErrorCategory::Window => 2000..3000,
                ErrorCategory::Authorization => 3000..4000,
                ErrorCategory::State => 4000..5000,
                ErrorCategory::InsufficientFunds => 5000..6000,
                ErrorCategory::NotFound => 6000..7000,
                ErrorCategory::Server => 9000..10000,
            };
            assert!(range.contains(&err.error_code()), "{err}");
        }
    }

    #[test]
    fn status_codes_follow_category() {
        assert_eq!(
            LedgerError::InvalidPoolParameters("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LedgerError::DuplicateVote { day: 1 }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            LedgerError::NotSettled(PoolId::new(1)).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LedgerError::PoolNotFound(PoolId::new(1)).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn response_carries_status() {
        let response = LedgerError::SelfVote.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
