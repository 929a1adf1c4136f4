//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage};
use super::subscription::PoolFilter;
use crate::api::dto::PoolStateResponse;
use crate::domain::{LedgerEvent, PoolId};
use crate::service::LedgerService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<LedgerEvent>,
    ledger: Arc<LedgerService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut filter = PoolFilter::new();
    tracing::debug!("ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut filter, &ledger).await;
                        if let Some(json) = reply.to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(ledger_event) => {
                        if filter.matches(&ledger_event) {
                            let payload = serde_json::to_value(&ledger_event).unwrap_or_default();
                            let Some(json) = WsMessage::event(payload).to_json() else {
                                continue;
                            };
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client and builds the reply envelope.
async fn handle_text_message(
    text: &str,
    filter: &mut PoolFilter,
    ledger: &LedgerService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { pool_ids } => {
            let added = filter.subscribe(&pool_ids);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "subscribed": added,
                    "count": filter.count(),
                    "wildcard": filter.is_wildcard(),
                }),
            )
        }
        WsCommand::Unsubscribe { pool_ids } => {
            let removed = filter.unsubscribe(&pool_ids);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "unsubscribed": removed,
                    "remaining_count": filter.count(),
                    "wildcard": filter.is_wildcard(),
                }),
            )
        }
        WsCommand::GetState { pool_id } => match ledger.pool_state(PoolId::new(pool_id)).await {
            Ok(state) => WsMessage::response(
                msg.id,
                serde_json::to_value(PoolStateResponse::from(state)).unwrap_or_default(),
            ),
            Err(err) => WsMessage::error(msg.id, err.error_code(), err.to_string()),
        },
    }
}
