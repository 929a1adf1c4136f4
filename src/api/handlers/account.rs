//! Custody account handlers: balance and faucet deposit.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{BalanceResponse, DepositRequest, parse_address, parse_amount};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, LedgerError};

/// `GET /accounts/{address}` — Custody balance.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAddress`] on a malformed address.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{address}",
    tag = "Accounts",
    summary = "Get custody balance",
    params(("address" = String, Path, description = "0x-prefixed address")),
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
        (status = 400, description = "Invalid address", body = ErrorResponse),
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    let address = parse_address("address", &address)?;
    let balance = state.ledger.balance_of(&address)?;
    Ok(Json(BalanceResponse::new(&address, balance)))
}

/// `POST /accounts/{address}/deposit` — Faucet deposit.
///
/// # Errors
///
/// Returns [`LedgerError::FaucetDisabled`] unless the faucet is enabled.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{address}/deposit",
    tag = "Accounts",
    summary = "Faucet deposit",
    description = "Credits custody funds for development setups. Disabled unless `CUSTODY_FAUCET_ENABLED` is set.",
    params(("address" = String, Path, description = "0x-prefixed address")),
    request_body = DepositRequest,
    responses(
        (status = 200, description = "New balance", body = BalanceResponse),
        (status = 400, description = "Invalid address or amount", body = ErrorResponse),
        (status = 403, description = "Faucet disabled", body = ErrorResponse),
    )
)]
pub async fn deposit(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(req): Json<DepositRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    if !state.faucet_enabled {
        return Err(LedgerError::FaucetDisabled);
    }
    let address = parse_address("address", &address)?;
    let amount = parse_amount("amount", &req.amount)?;
    let balance = state.ledger.deposit(&address, amount)?;
    Ok(Json(BalanceResponse::new(&address, balance)))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/{address}", get(get_balance))
        .route("/accounts/{address}/deposit", post(deposit))
}
