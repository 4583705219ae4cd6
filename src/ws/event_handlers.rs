//! WebSocket Event Handlers - dispatch of client events to the messaging core

use crate::core::ChatError;
use crate::dtos::{ClientEvent, CreateMessageDTO, ServerEvent};
use crate::entities::CurrentUser;
use crate::messaging::{send_message, stop_typing, typing};
use crate::ws::presence::ConnectionHandle;
use crate::AppState;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Reason shown to the client in a `sendError` event
fn client_reason(err: &ChatError) -> String {
    match err {
        ChatError::Validation(reason) => reason.clone(),
        ChatError::NotFound => "Not found".to_string(),
        ChatError::TransientStore(_) | ChatError::Timeout => {
            "Message could not be stored, please retry".to_string()
        }
    }
}

/// Handles one event from a live connection.
///
/// The identity is always the authenticated user of the connection: a
/// `join` naming someone else is refused, and sends are attributed to the
/// authenticated user.
#[instrument(skip(state, user, handle, event), fields(user_id = %user.user_id, connection_id = handle.id()))]
pub async fn process_event(
    state: &AppState,
    user: &CurrentUser,
    handle: &ConnectionHandle,
    event: ClientEvent,
) {
    match event {
        ClientEvent::Join { user_id } => {
            if user_id != user.user_id {
                warn!(requested = %user_id, "Join refused for another user id");
                handle.push(Arc::new(ServerEvent::error("Cannot join as another user")));
                return;
            }
            if let Some(previous) = state.presence.join(&user_id, handle.clone()) {
                if previous.id() != handle.id() {
                    info!(previous_connection = previous.id(), "Previous connection superseded");
                }
            }
        }
        ClientEvent::Send {
            receiver_id,
            body,
            item_ref,
        } => {
            let data = CreateMessageDTO::new(user.user_id.clone(), receiver_id, body, item_ref);
            if let Err(err) = send_message(state, handle, data).await {
                warn!("Send rejected: {}", err);
                handle.push(Arc::new(ServerEvent::error(client_reason(&err))));
            }
        }
        ClientEvent::Typing { receiver_id } => {
            typing(state, &user.user_id, &receiver_id);
        }
        ClientEvent::StopTyping { receiver_id } => {
            stop_typing(state, &user.user_id, &receiver_id);
        }
    }
}
