//! Conversation DTOs - Inbox entries and read-state responses

use super::message::MessageDTO;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inbox entry: a counterpart and the state of the conversation with them
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConversationDTO {
    pub counterpart_id: String,
    pub last_message_body: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MarkReadDTO {
    pub modified_count: u64,
}

/// Result of opening a conversation: how many messages flipped to read and
/// the history as it stands afterwards
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenConversationDTO {
    pub marked_read: u64,
    pub messages: Vec<MessageDTO>,
}
