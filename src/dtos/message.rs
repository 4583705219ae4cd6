//! Message DTOs - Data Transfer Objects for chat messages

use crate::core::ChatError;
use crate::entities::ChatMessage;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

pub const MAX_BODY_LEN: usize = 5000;

lazy_static! {
    // opaque ids handed out by the identity provider and the catalog
    static ref ID_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap();
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects missing and malformed user ids.
pub fn validate_participant_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(invalid("missing_id", "Participant id is required"));
    }
    if !ID_PATTERN.is_match(id) {
        return Err(invalid("malformed_id", "Participant id is malformed"));
    }
    Ok(())
}

fn validate_item_ref(item_ref: &str) -> Result<(), ValidationError> {
    if !ID_PATTERN.is_match(item_ref) {
        return Err(invalid("malformed_item_ref", "Item reference is malformed"));
    }
    Ok(())
}

/// Body must carry text once surrounding whitespace is removed.
pub fn validate_body(body: &str) -> Result<(), ValidationError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty_body", "Message body cannot be empty"));
    }
    if trimmed.chars().count() > MAX_BODY_LEN {
        return Err(invalid(
            "body_too_long",
            "Message body must be at most 5000 characters",
        ));
    }
    Ok(())
}

fn validate_distinct_participants(data: &CreateMessageDTO) -> Result<(), ValidationError> {
    if data.sender_id == data.receiver_id {
        return Err(invalid(
            "self_message",
            "Sender and receiver must be different users",
        ));
    }
    Ok(())
}

/// Client-facing message representation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageDTO {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub body: String,
    pub item_ref: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for MessageDTO {
    fn from(value: ChatMessage) -> Self {
        Self {
            id: value.id,
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            body: value.body,
            item_ref: value.item_ref,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}

/// Input of the message store's append (no id, no timestamp: both are server-assigned)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_distinct_participants"))]
pub struct CreateMessageDTO {
    #[validate(custom(function = "validate_participant_id"))]
    pub sender_id: String,

    #[validate(custom(function = "validate_participant_id"))]
    pub receiver_id: String,

    #[validate(custom(function = "validate_body"))]
    pub body: String,

    #[validate(custom(function = "validate_item_ref"))]
    pub item_ref: Option<String>,
}

impl CreateMessageDTO {
    pub fn new(
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        body: impl Into<String>,
        item_ref: Option<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            body: body.into(),
            item_ref,
        }
    }

    /// Validates and normalizes: the stored body is trimmed and an empty
    /// item reference counts as absent.
    pub fn into_validated(mut self) -> Result<Self, ChatError> {
        if self.item_ref.as_deref().is_some_and(|r| r.trim().is_empty()) {
            self.item_ref = None;
        }
        self.validate()?;
        self.body = self.body.trim().to_string();
        Ok(self)
    }
}

/// Body of `POST /chat`; the sender is always the authenticated caller
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendMessageDTO {
    #[serde(default)]
    pub receiver_id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub item_ref: Option<String>,
}

impl SendMessageDTO {
    pub fn into_create(self, sender_id: &str) -> CreateMessageDTO {
        CreateMessageDTO::new(sender_id, self.receiver_id, self.body, self.item_ref)
    }
}
