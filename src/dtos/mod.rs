//! DTOs module - Data Transfer Objects
//!
//! Shapes exchanged with clients over HTTP and WebSocket, kept apart from the
//! persisted entities.

pub mod conversation;
pub mod message;
pub mod ws_event;

pub use conversation::{ConversationDTO, MarkReadDTO, OpenConversationDTO};
pub use message::{
    CreateMessageDTO, MAX_BODY_LEN, MessageDTO, SendMessageDTO, validate_body,
    validate_participant_id,
};
pub use ws_event::{ClientEvent, ServerEvent};
