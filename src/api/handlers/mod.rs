//! REST endpoint handlers organized by resource.

pub mod account;
pub mod membership;
pub mod pool;
pub mod proof;
pub mod settlement;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pool::routes())
        .merge(membership::routes())
        .merge(proof::routes())
        .merge(settlement::routes())
        .merge(account::routes())
}
