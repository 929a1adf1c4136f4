//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PoolId;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Server-originated event envelope with a fresh id.
    #[must_use]
    pub fn event(payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Response to the command with id `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Error reply to the command with id `id`.
    #[must_use]
    pub fn error(id: String, code: u32, message: impl Into<String>) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }

    /// Serializes the envelope; `None` only if serialization fails.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// One entry of a `pool_ids` list: a numeric id, a numeric string, or the
/// `"*"` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PoolSelector {
    /// Numeric pool id.
    Id(u64),
    /// String form: `"*"` or a decimal id.
    Text(String),
}

impl PoolSelector {
    /// Returns `true` for the `"*"` wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Text(s) if s == "*")
    }

    /// Returns the selected pool id, if this is not the wildcard.
    #[must_use]
    pub fn pool_id(&self) -> Option<PoolId> {
        match self {
            Self::Id(id) => Some(PoolId::new(*id)),
            Self::Text(s) => s.parse::<u64>().ok().map(PoolId::new),
        }
    }
}

/// Commands that a client can send over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific pools.
    Subscribe {
        /// Pools to subscribe to. Use `["*"]` for all pools.
        pool_ids: Vec<PoolSelector>,
    },
    /// Unsubscribe from events for specific pools.
    Unsubscribe {
        /// Pools to unsubscribe from. `"*"` drops the wildcard.
        pool_ids: Vec<PoolSelector>,
    },
    /// Get the current economic state of a pool.
    GetState {
        /// Target pool id.
        pool_id: u64,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_accepts_numbers_strings_and_wildcard() {
        let payload = serde_json::json!({
            "command": "subscribe",
            "pool_ids": [0, "7", "*", "bogus"],
        });
        let Ok(WsCommand::Subscribe { pool_ids }) = serde_json::from_value::<WsCommand>(payload)
        else {
            panic!("expected subscribe command");
        };
        let ids: Vec<Option<PoolId>> = pool_ids.iter().map(PoolSelector::pool_id).collect();
        assert_eq!(
            ids,
            vec![Some(PoolId::new(0)), Some(PoolId::new(7)), None, None]
        );
        assert!(pool_ids.iter().any(PoolSelector::is_wildcard));
    }

    #[test]
    fn get_state_command_parses() {
        let payload = serde_json::json!({ "command": "get_state", "pool_id": 3 });
        let Ok(WsCommand::GetState { pool_id }) = serde_json::from_value::<WsCommand>(payload)
        else {
            panic!("expected get_state command");
        };
        assert_eq!(pool_id, 3);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let payload = serde_json::json!({ "command": "launch", "pool_id": 3 });
        assert!(serde_json::from_value::<WsCommand>(payload).is_err());
    }

    #[test]
    fn envelope_type_is_renamed() {
        let json = WsMessage::error("c1".to_string(), 400, "bad").to_json().unwrap_or_default();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"id\":\"c1\""));
    }
}
