//! Delivery Engine - persist, then fan out to the receiver and back to the sender

use crate::core::{AppState, ChatError};
use crate::dtos::{CreateMessageDTO, MessageDTO, ServerEvent};
use crate::entities::ChatMessage;
use crate::repositories::Create;
use crate::ws::presence::{ConnectionHandle, DeliveryOutcome};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Sends a message on behalf of the owner of `origin`.
///
/// 1. Persists through the message store; validation and storage errors are
///    returned unchanged and nothing is pushed.
/// 2. Pushes `messageReceived` to the receiver's live connection, if any.
/// 3. Pushes `messageSent` back to `origin`, and to the sender's registered
///    connection when that is a different one.
///
/// Appends from one connection are awaited one after the other, so a single
/// sender's messages reach the store in invocation order.
#[instrument(skip(state, origin, data), fields(
    connection_id = origin.id(),
    sender_id = %data.sender_id,
    receiver_id = %data.receiver_id
))]
pub async fn send_message(
    state: &AppState,
    origin: &ConnectionHandle,
    data: CreateMessageDTO,
) -> Result<ChatMessage, ChatError> {
    let message = state.msg.create(&data).await?;
    let dto = MessageDTO::from(message.clone());

    let received = Arc::new(ServerEvent::MessageReceived(dto.clone()));
    match state.presence.push_to(&message.receiver_id, received) {
        DeliveryOutcome::Delivered => debug!(message_id = message.id, "Pushed to receiver"),
        outcome => debug!(
            message_id = message.id,
            ?outcome,
            "Receiver not reached, message stays available through history"
        ),
    }

    let ack = Arc::new(ServerEvent::MessageSent(dto));
    origin.push(ack.clone());
    if let Some(registered) = state.presence.lookup(&message.sender_id) {
        if registered.id() != origin.id() {
            registered.push(ack);
        }
    }

    info!(message_id = message.id, "Message sent");
    Ok(message)
}
