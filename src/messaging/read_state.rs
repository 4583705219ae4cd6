//! Read/Typing State Manager
//!
//! Read flags are persisted through the message store; typing signals are
//! ephemeral and only ever pushed, at most once per call.

use crate::core::{AppState, ChatError};
use crate::dtos::ServerEvent;
use crate::entities::ChatMessage;
use crate::ws::presence::DeliveryOutcome;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct OpenedConversation {
    /// Messages from the counterpart that flipped to read on this call
    pub marked_read: u64,
    pub messages: Vec<ChatMessage>,
}

/// The viewer enters the conversation: everything the counterpart sent them
/// becomes read, then the up-to-date history is returned. Safe to repeat.
#[instrument(skip(state))]
pub async fn open_conversation(
    state: &AppState,
    viewer_id: &str,
    counterpart_id: &str,
) -> Result<OpenedConversation, ChatError> {
    let marked_read = state.msg.mark_read(counterpart_id, viewer_id).await?;
    let messages = state.msg.history(viewer_id, counterpart_id).await?;
    debug!(marked_read, count = messages.len(), "Conversation opened");
    Ok(OpenedConversation {
        marked_read,
        messages,
    })
}

pub fn typing(state: &AppState, sender_id: &str, receiver_id: &str) -> DeliveryOutcome {
    signal(state, sender_id, receiver_id, ServerEvent::UserTyping {
        user_id: sender_id.to_string(),
    })
}

pub fn stop_typing(state: &AppState, sender_id: &str, receiver_id: &str) -> DeliveryOutcome {
    signal(state, sender_id, receiver_id, ServerEvent::UserStoppedTyping {
        user_id: sender_id.to_string(),
    })
}

fn signal(
    state: &AppState,
    sender_id: &str,
    receiver_id: &str,
    event: ServerEvent,
) -> DeliveryOutcome {
    // no conversation with oneself, so nothing to signal
    if sender_id == receiver_id {
        debug!(sender_id, event = event.name(), "Self-addressed signal ignored");
        return DeliveryOutcome::Ignored;
    }
    state.presence.push_to(receiver_id, Arc::new(event))
}
