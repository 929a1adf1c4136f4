//! Pool handlers: create, list, count, details, state, participants.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreatePoolRequest, PaginationParams, ParticipantsResponse, PoolCountResponse,
    PoolDetailsResponse, PoolListResponse, PoolStateResponse, PoolSummaryDto,
};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /pools` — Create a new commitment pool.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidPoolParameters`] on invalid parameters.
#[utoipa::path(
    post,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "Create a commitment pool",
    description = "Creates a pool with the next sequential id. No stake moves until participants join.",
    request_body = CreatePoolRequest,
    responses(
        (status = 201, description = "Pool created", body = PoolDetailsResponse),
        (status = 400, description = "Invalid pool parameters", body = ErrorResponse),
    )
)]
pub async fn create_pool(
    State(state): State<AppState>,
    Json(req): Json<CreatePoolRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let params = req.into_params()?;
    let details = state.ledger.create_pool(params).await?;
    Ok((StatusCode::CREATED, Json(PoolDetailsResponse::from(details))))
}

/// `GET /pools` — List pools with pagination.
///
/// # Errors
///
/// Never fails; the `Result` keeps the handler signature uniform.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List pools",
    description = "Returns a paginated list of all pools ordered by id.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated pool list", body = PoolListResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, LedgerError> {
    let summaries: Vec<PoolSummaryDto> = state
        .ledger
        .list_pools()
        .await
        .into_iter()
        .map(PoolSummaryDto::from)
        .collect();
    let (data, pagination) = params.paginate(summaries);
    Ok(Json(PoolListResponse { data, pagination }))
}

/// `GET /pools/count` — Number of pools ever created.
#[utoipa::path(
    get,
    path = "/api/v1/pools/count",
    tag = "Pools",
    summary = "Pool count",
    responses(
        (status = 200, description = "Allocated pool ids", body = PoolCountResponse),
    )
)]
pub async fn pool_count(State(state): State<AppState>) -> impl IntoResponse {
    Json(PoolCountResponse {
        count: state.ledger.pool_count().await,
    })
}

/// `GET /pools/{id}` — Pool details.
///
/// # Errors
///
/// Returns [`LedgerError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Get pool details",
    params(("id" = u64, Path, description = "Pool id")),
    responses(
        (status = 200, description = "Pool details", body = PoolDetailsResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, LedgerError> {
    let details = state.ledger.pool_details(PoolId::new(id)).await?;
    Ok(Json(PoolDetailsResponse::from(details)))
}

/// `GET /pools/{id}/state` — Pool economic state.
///
/// # Errors
///
/// Returns [`LedgerError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/state",
    tag = "Pools",
    summary = "Get pool state",
    description = "Returns phase, settlement flags, refund state, reward per winner and escrow as observed now.",
    params(("id" = u64, Path, description = "Pool id")),
    responses(
        (status = 200, description = "Pool state", body = PoolStateResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool_state(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, LedgerError> {
    let pool_state = state.ledger.pool_state(PoolId::new(id)).await?;
    Ok(Json(PoolStateResponse::from(pool_state)))
}

/// `GET /pools/{id}/participants` — Participants in join order.
///
/// # Errors
///
/// Returns [`LedgerError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/participants",
    tag = "Pools",
    summary = "List participants",
    params(("id" = u64, Path, description = "Pool id")),
    responses(
        (status = 200, description = "Participants in join order", body = ParticipantsResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_participants(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, LedgerError> {
    let participants = state.ledger.participants(PoolId::new(id)).await?;
    Ok(Json(ParticipantsResponse {
        pool_id: id,
        participants: participants.iter().map(ToString::to_string).collect(),
    }))
}

/// Pool routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", post(create_pool).get(list_pools))
        .route("/pools/count", get(pool_count))
        .route("/pools/{id}", get(get_pool))
        .route("/pools/{id}/state", get(get_pool_state))
        .route("/pools/{id}/participants", get(get_participants))
}
