//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use super::dto;
use super::handlers::{account, membership, pool, proof, settlement, system};
use crate::error::{ErrorBody, ErrorCategory, ErrorResponse};

/// OpenAPI 3 description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Commitment Pool Ledger",
        description = "Staked habit challenges with quorum-verified daily proofs."
    ),
    paths(
        pool::create_pool,
        pool::list_pools,
        pool::pool_count,
        pool::get_pool,
        pool::get_pool_state,
        pool::get_participants,
        membership::join_pool,
        membership::get_user_progress,
        proof::submit_proof,
        proof::cast_vote,
        proof::get_submission,
        settlement::settle_pool,
        settlement::withdraw_reward,
        settlement::sweep_dust,
        account::get_balance,
        account::deposit,
        system::health_handler,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        ErrorCategory,
        dto::CallerRequest,
        dto::CreatePoolRequest,
        dto::SubmitProofRequest,
        dto::VoteRequest,
        dto::DepositRequest,
    )),
    tags(
        (name = "Pools", description = "Pool creation and read views"),
        (name = "Membership", description = "Joining and participant progress"),
        (name = "Proofs", description = "Daily proofs and peer votes"),
        (name = "Settlement", description = "Settlement, withdrawals and dust"),
        (name = "Accounts", description = "Custody balances"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;
