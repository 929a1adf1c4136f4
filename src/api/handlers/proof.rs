//! Proof and vote handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{SubmissionResponse, SubmitProofRequest, VoteRequest, parse_address};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /pools/{id}/proofs` — Submit today's proof.
///
/// # Errors
///
/// Returns [`LedgerError`] on an empty proof, non-membership, inactive
/// pool, closed proof window or a proof that already received votes.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/proofs",
    tag = "Proofs",
    summary = "Submit a daily proof",
    description = "Records the caller's proof for the current day. A proof may be replaced until it receives its first vote.",
    params(("id" = u64, Path, description = "Pool id")),
    request_body = SubmitProofRequest,
    responses(
        (status = 201, description = "Proof recorded", body = SubmissionResponse),
        (status = 400, description = "Invalid proof or address", body = ErrorResponse),
        (status = 403, description = "Not joined or already voted on", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Window closed or pool inactive", body = ErrorResponse),
    )
)]
pub async fn submit_proof(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<SubmitProofRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let caller = parse_address("caller", &req.caller)?;
    let (day, view) = state
        .ledger
        .submit_proof(PoolId::new(id), caller, req.proof_ref)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::new(id, day, caller.to_string(), view)),
    ))
}

/// `POST /pools/{id}/votes` — Vote on a peer's proof.
///
/// # Errors
///
/// Returns [`LedgerError`] on self votes, duplicate votes, non-membership,
/// missing submissions or a day outside the voting window.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/votes",
    tag = "Proofs",
    summary = "Vote on a proof",
    description = "Approves or rejects another participant's proof for the current day and returns the updated tally.",
    params(("id" = u64, Path, description = "Pool id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote counted", body = SubmissionResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 403, description = "Self vote, duplicate vote or not joined", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Day not open for voting or no submission", body = ErrorResponse),
    )
)]
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let caller = parse_address("caller", &req.caller)?;
    let target = parse_address("target", &req.target)?;
    let view = state
        .ledger
        .vote(PoolId::new(id), caller, req.day, target, req.approve)
        .await?;
    Ok(Json(SubmissionResponse::new(
        id,
        req.day,
        target.to_string(),
        view,
    )))
}

/// `GET /pools/{id}/days/{day}/submissions/{user}` — Submission lookup.
///
/// # Errors
///
/// Returns [`LedgerError::PoolNotFound`] or
/// [`LedgerError::SubmissionNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/days/{day}/submissions/{user}",
    tag = "Proofs",
    summary = "Get a submission",
    params(
        ("id" = u64, Path, description = "Pool id"),
        ("day" = u64, Path, description = "Day index"),
        ("user" = String, Path, description = "0x-prefixed address"),
    ),
    responses(
        (status = 200, description = "Submission with tally", body = SubmissionResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 404, description = "Pool or submission not found", body = ErrorResponse),
    )
)]
pub async fn get_submission(
    State(state): State<AppState>,
    Path((id, day, user)): Path<(u64, u64, String)>,
) -> Result<impl IntoResponse, LedgerError> {
    let user = parse_address("user", &user)?;
    let view = state.ledger.submission(PoolId::new(id), day, user).await?;
    Ok(Json(SubmissionResponse::new(id, day, user.to_string(), view)))
}

/// Proof and vote routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/proofs", post(submit_proof))
        .route("/pools/{id}/votes", post(cast_vote))
        .route(
            "/pools/{id}/days/{day}/submissions/{user}",
            get(get_submission),
        )
}
