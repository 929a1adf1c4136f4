//! Membership handlers: join and participant progress.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CallerRequest, JoinResponse, UserProgressResponse, parse_address};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /pools/{id}/join` — Escrow the caller's stake and join.
///
/// # Errors
///
/// Returns [`LedgerError`] on closed registration, double join, canceled or
/// settled pools, or insufficient custody balance.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/join",
    tag = "Membership",
    summary = "Join a pool",
    description = "Moves exactly the pool's stake from the caller's custody balance into escrow.",
    params(("id" = u64, Path, description = "Pool id")),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Joined", body = JoinResponse),
        (status = 400, description = "Invalid caller address", body = ErrorResponse),
        (status = 403, description = "Already joined", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Registration closed or pool inactive", body = ErrorResponse),
        (status = 422, description = "Insufficient stake", body = ErrorResponse),
    )
)]
pub async fn join_pool(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CallerRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let caller = parse_address("caller", &req.caller)?;
    let pool_state = state.ledger.join_pool(PoolId::new(id), caller).await?;
    Ok(Json(JoinResponse::new(caller, &pool_state)))
}

/// `GET /pools/{id}/users/{user}` — Participant progress.
///
/// # Errors
///
/// Returns [`LedgerError::PoolNotFound`] or [`LedgerError::InvalidAddress`].
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/users/{user}",
    tag = "Membership",
    summary = "Get user progress",
    description = "Returns verified days, votes cast and withdrawal status. Non-participants get a zeroed record with `has_joined = false`.",
    params(
        ("id" = u64, Path, description = "Pool id"),
        ("user" = String, Path, description = "0x-prefixed address"),
    ),
    responses(
        (status = 200, description = "User progress", body = UserProgressResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_user_progress(
    State(state): State<AppState>,
    Path((id, user)): Path<(u64, String)>,
) -> Result<impl IntoResponse, LedgerError> {
    let pool_id = PoolId::new(id);
    let user = parse_address("user", &user)?;
    let progress = state.ledger.user_progress(pool_id, user).await?;
    Ok(Json(UserProgressResponse::new(pool_id, user, progress)))
}

/// Membership routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/join", post(join_pool))
        .route("/pools/{id}/users/{user}", get(get_user_progress))
}
