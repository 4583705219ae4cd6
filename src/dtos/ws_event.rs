//! WebSocket Event DTOs - Frames exchanged over a live connection
//!
//! Every frame is a tagged JSON object:
//! `{ "event": "send", "data": { "receiver_id": "bob", "body": "hi" } }`

use crate::dtos::MessageDTO;
use serde::{Deserialize, Serialize};

/// Client -> server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    Join {
        user_id: String,
    },
    Send {
        #[serde(default)]
        receiver_id: String,
        #[serde(default)]
        body: String,
        #[serde(default)]
        item_ref: Option<String>,
    },
    Typing {
        receiver_id: String,
    },
    StopTyping {
        receiver_id: String,
    },
}

/// Server -> client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    MessageReceived(MessageDTO),
    /// Acknowledgment of a persisted message to its sender
    MessageSent(MessageDTO),
    UserTyping { user_id: String },
    UserStoppedTyping { user_id: String },
    SendError { reason: String },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::MessageReceived(_) => "messageReceived",
            ServerEvent::MessageSent(_) => "messageSent",
            ServerEvent::UserTyping { .. } => "userTyping",
            ServerEvent::UserStoppedTyping { .. } => "userStoppedTyping",
            ServerEvent::SendError { .. } => "sendError",
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        ServerEvent::SendError {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_events_parse_from_tagged_frames() {
        let send: ClientEvent = serde_json::from_value(json!({
            "event": "send",
            "data": { "receiver_id": "bob", "body": "Is this still available?", "item_ref": "tomatoes-42" }
        }))
        .expect("send frame");
        assert_eq!(
            send,
            ClientEvent::Send {
                receiver_id: "bob".to_string(),
                body: "Is this still available?".to_string(),
                item_ref: Some("tomatoes-42".to_string()),
            }
        );

        let stop: ClientEvent =
            serde_json::from_value(json!({ "event": "stopTyping", "data": { "receiver_id": "bob" } }))
                .expect("stopTyping frame");
        assert_eq!(
            stop,
            ClientEvent::StopTyping {
                receiver_id: "bob".to_string()
            }
        );
    }

    #[test]
    fn unknown_event_is_rejected() {
        let parsed = serde_json::from_value::<ClientEvent>(json!({ "event": "delete", "data": {} }));
        assert!(parsed.is_err());
    }

    #[test]
    fn server_event_tag_matches_name() {
        let event = ServerEvent::UserTyping {
            user_id: "alice".to_string(),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event"], event.name());
        assert_eq!(value["data"]["user_id"], "alice");
    }
}
