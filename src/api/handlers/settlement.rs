//! Settlement handlers: settle, withdraw, sweep dust.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    CallerRequest, SettlementResponse, SweepDustResponse, WithdrawResponse, parse_address,
};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /pools/{id}/settle` — Process pool results.
///
/// # Errors
///
/// Returns [`LedgerError`] if the pool is canceled, already settled or its
/// duration has not elapsed.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/settle",
    tag = "Settlement",
    summary = "Settle a pool",
    description = "Finalizes every day and fixes each participant's entitlement. Anyone may trigger settlement once the duration has elapsed.",
    params(("id" = u64, Path, description = "Pool id")),
    responses(
        (status = 200, description = "Pool settled", body = SettlementResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not settleable, canceled or already settled", body = ErrorResponse),
    )
)]
pub async fn settle_pool(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, LedgerError> {
    let pool_id = PoolId::new(id);
    let settlement = state.ledger.process_pool_results(pool_id).await?;
    Ok(Json(SettlementResponse::new(pool_id, &settlement)))
}

/// `POST /pools/{id}/withdraw` — Withdraw the caller's entitlement.
///
/// # Errors
///
/// Returns [`LedgerError`] if the caller never joined, already withdrew, or
/// the pool is neither settled nor canceled.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/withdraw",
    tag = "Settlement",
    summary = "Withdraw reward or refund",
    description = "Credits the caller's fixed entitlement (or stake refund for canceled pools) to custody. Zero entitlements succeed without a transfer.",
    params(("id" = u64, Path, description = "Pool id")),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Withdrawn", body = WithdrawResponse),
        (status = 400, description = "Invalid caller address", body = ErrorResponse),
        (status = 403, description = "Not joined", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not settled or already withdrawn", body = ErrorResponse),
    )
)]
pub async fn withdraw_reward(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CallerRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let caller = parse_address("caller", &req.caller)?;
    let payout = state.ledger.withdraw_reward(PoolId::new(id), caller).await?;
    Ok(Json(WithdrawResponse {
        pool_id: id,
        participant: caller.to_string(),
        amount: payout.amount.to_string(),
        refund: payout.refund,
    }))
}

/// `POST /pools/{id}/sweep-dust` — Move settlement dust to the operator.
///
/// # Errors
///
/// Returns [`LedgerError`] if the caller is not the operator, the pool is
/// not settled, or there is no dust left.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/sweep-dust",
    tag = "Settlement",
    summary = "Sweep settlement dust",
    params(("id" = u64, Path, description = "Pool id")),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Dust swept", body = SweepDustResponse),
        (status = 403, description = "Caller is not the operator", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not settled or no dust", body = ErrorResponse),
    )
)]
pub async fn sweep_dust(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CallerRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let caller = parse_address("caller", &req.caller)?;
    let amount = state.ledger.sweep_dust(PoolId::new(id), caller).await?;
    Ok(Json(SweepDustResponse {
        pool_id: id,
        operator: caller.to_string(),
        amount: amount.to_string(),
    }))
}

/// Settlement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/settle", post(settle_pool))
        .route("/pools/{id}/withdraw", post(withdraw_reward))
        .route("/pools/{id}/sweep-dust", post(sweep_dust))
}
