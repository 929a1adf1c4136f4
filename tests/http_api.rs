//! End-to-end REST tests: the real router served on an ephemeral port,
//! driven with `reqwest` while a [`ManualClock`] controls ledger time.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};

use commitment_pool_ledger::api::build_app;
use commitment_pool_ledger::app_state::AppState;
use commitment_pool_ledger::domain::{
    Clock, Custody, EventBus, InMemoryCustody, ManualClock, PoolRegistry,
};
use commitment_pool_ledger::service::LedgerService;

const NOW: i64 = 1_700_000_000;
const REG_END: i64 = NOW + 3_600;
const STAKE: u128 = 10_000_000;

struct TestServer {
    base: String,
    clock: Arc<ManualClock>,
    client: reqwest::Client,
}

fn addr(b: u8) -> String {
    format!("0x{}", hex::encode([b; 20]))
}

async fn spawn_server(faucet_enabled: bool) -> TestServer {
    let clock = Arc::new(ManualClock::new(NOW));
    let ledger = LedgerService::new(
        Arc::new(PoolRegistry::new()),
        Arc::new(InMemoryCustody::new()) as Arc<dyn Custody>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        EventBus::new(256),
    )
    .with_operator(addr(0xee).parse().ok());
    let app = build_app(
        AppState::new(Arc::new(ledger), faucet_enabled),
        Duration::from_secs(5),
    );

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(local) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        base: format!("http://{local}"),
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestServer {
    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let Ok(resp) = self.client.get(format!("{}{path}", self.base)).send().await else {
            panic!("GET {path} failed");
        };
        let status = resp.status();
        (status, resp.json().await.unwrap_or_default())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let Ok(resp) = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
        else {
            panic!("POST {path} failed");
        };
        let status = resp.status();
        (status, resp.json().await.unwrap_or_default())
    }

    async fn create_pool(&self) -> u64 {
        let (status, body) = self
            .post(
                "/api/v1/pools",
                json!({
                    "name": "Daily Run",
                    "stake_amount": STAKE.to_string(),
                    "duration_days": 3,
                    "start_time": REG_END,
                    "registration_end_time": REG_END,
                    "min_contributors": 2,
                    "quorum_bps": 5000,
                    "min_votes_required": 1,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["pool_id"].as_u64().unwrap_or(u64::MAX)
    }

    async fn fund_and_join(&self, pool_id: u64, who: u8) {
        let (status, _) = self
            .post(
                &format!("/api/v1/accounts/{}/deposit", addr(who)),
                json!({ "amount": STAKE.to_string() }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self
            .post(
                &format!("/api/v1/pools/{pool_id}/join"),
                json!({ "caller": addr(who) }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}

#[tokio::test]
async fn health_reports_pool_count() {
    let server = spawn_server(true).await;
    server.create_pool().await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pools"], json!(1));
}

#[tokio::test]
async fn invalid_pool_parameters_are_rejected() {
    let server = spawn_server(true).await;
    let (status, body) = server
        .post(
            "/api/v1/pools",
            json!({
                "name": "",
                "stake_amount": "0",
                "duration_days": 0,
                "start_time": REG_END,
                "registration_end_time": REG_END,
                "min_contributors": 0,
                "quorum_bps": 20000,
                "min_votes_required": 0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["category"], json!("validation"));

    let (_, count) = server.get("/api/v1/pools/count").await;
    assert_eq!(count["count"], json!(0));
}

#[tokio::test]
async fn unknown_pool_is_404() {
    let server = spawn_server(true).await;
    let (status, body) = server.get("/api/v1/pools/42/state").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["category"], json!("not_found"));
}

#[tokio::test]
async fn faucet_can_be_disabled() {
    let server = spawn_server(false).await;
    let (status, _) = server
        .post(
            &format!("/api/v1/accounts/{}/deposit", addr(1)),
            json!({ "amount": "5" }),
        )
        .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn join_after_registration_is_a_window_error() {
    let server = spawn_server(true).await;
    let pool_id = server.create_pool().await;
    server.fund_and_join(pool_id, 1).await;
    server.fund_and_join(pool_id, 2).await;
    server.clock.set(REG_END + 1);

    let (status, body) = server
        .post(
            &format!("/api/v1/pools/{pool_id}/join"),
            json!({ "caller": addr(3) }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], json!("window"));
}

#[tokio::test]
async fn undersubscribed_pool_refunds_stakes() {
    let server = spawn_server(true).await;
    let pool_id = server.create_pool().await;
    server.fund_and_join(pool_id, 1).await;
    server.clock.set(REG_END + 1);

    let (_, state) = server.get(&format!("/api/v1/pools/{pool_id}/state")).await;
    assert_eq!(state["phase"], json!("canceled"));

    let (status, body) = server
        .post(
            &format!("/api/v1/pools/{pool_id}/withdraw"),
            json!({ "caller": addr(1) }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["refund"], json!(true));
    assert_eq!(body["amount"], json!(STAKE.to_string()));
}

#[tokio::test]
async fn full_lifecycle_over_http() {
    let server = spawn_server(true).await;
    let pool_id = server.create_pool().await;
    for who in [1, 2, 3] {
        server.fund_and_join(pool_id, who).await;
    }

    let (_, participants) = server
        .get(&format!("/api/v1/pools/{pool_id}/participants"))
        .await;
    assert_eq!(participants["participants"].as_array().map(Vec::len), Some(3));

    server.clock.set(REG_END + 1);
    for who in [1, 2] {
        let (status, body) = server
            .post(
                &format!("/api/v1/pools/{pool_id}/proofs"),
                json!({ "caller": addr(who), "proof_ref": format!("ipfs://proof-{who}") }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["day"], json!(0));
    }

    for (voter, target) in [(2, 1), (3, 2)] {
        let (status, body) = server
            .post(
                &format!("/api/v1/pools/{pool_id}/votes"),
                json!({ "caller": addr(voter), "day": 0, "target": addr(target), "approve": true }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["is_verified"], json!(true));
    }

    let (status, body) = server
        .post(
            &format!("/api/v1/pools/{pool_id}/votes"),
            json!({ "caller": addr(1), "day": 0, "target": addr(1), "approve": true }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, _) = server.post(&format!("/api/v1/pools/{pool_id}/settle"), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    server.clock.advance_days(3);
    let (status, settlement) = server
        .post(&format!("/api/v1/pools/{pool_id}/settle"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{settlement}");
    assert_eq!(settlement["qualifying_count"], json!(2));
    assert_eq!(settlement["reward_per_winner"], json!((STAKE / 2).to_string()));

    for who in [1, 2] {
        let (status, body) = server
            .post(
                &format!("/api/v1/pools/{pool_id}/withdraw"),
                json!({ "caller": addr(who) }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["amount"], json!((STAKE + STAKE / 2).to_string()));
    }

    let (status, _) = server
        .post(
            &format!("/api/v1/pools/{pool_id}/withdraw"),
            json!({ "caller": addr(1) }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, balance) = server.get(&format!("/api/v1/accounts/{}", addr(2))).await;
    assert_eq!(balance["balance"], json!((STAKE + STAKE / 2).to_string()));
    assert_eq!(balance["balance_display"], json!("15.000000"));

    let (_, state) = server.get(&format!("/api/v1/pools/{pool_id}/state")).await;
    assert_eq!(state["phase"], json!("settled"));
    assert_eq!(state["settled"], json!(true));

}
