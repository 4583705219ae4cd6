//! Chat services - inbox, history and read-state endpoints

use crate::core::{AppError, AppState, ChatError};
use crate::dtos::{
    ConversationDTO, MarkReadDTO, MessageDTO, OpenConversationDTO, SendMessageDTO,
    validate_participant_id,
};
use crate::entities::CurrentUser;
use crate::messaging;
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{
        Json, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

fn check_counterpart(counterpart_id: &str) -> Result<(), AppError> {
    validate_participant_id(counterpart_id).map_err(|e| {
        warn!(counterpart_id, "Rejected malformed counterpart id");
        AppError::from(ChatError::from(e))
    })
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<Vec<ConversationDTO>>, AppError> {
    debug!("Listing conversations");
    let conversations = state
        .conversations
        .conversations_for(&current_user.user_id)
        .await?;

    info!("Retrieved {} conversations", conversations.len());
    Ok(Json(conversations))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(counterpart_id): Path<String>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    // 1. Validate the counterpart id taken from the path
    // 2. Load the messages in both directions, oldest first
    check_counterpart(&counterpart_id)?;

    let messages: Vec<MessageDTO> = state
        .msg
        .history(&current_user.user_id, &counterpart_id)
        .await?
        .into_iter()
        .map(MessageDTO::from)
        .collect();

    debug!("Retrieved {} messages", messages.len());
    Ok(Json(messages))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn open_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(counterpart_id): Path<String>,
) -> Result<Json<OpenConversationDTO>, AppError> {
    check_counterpart(&counterpart_id)?;

    let opened =
        messaging::open_conversation(&state, &current_user.user_id, &counterpart_id).await?;

    info!(marked_read = opened.marked_read, "Conversation opened");
    Ok(Json(OpenConversationDTO {
        marked_read: opened.marked_read,
        messages: opened.messages.into_iter().map(MessageDTO::from).collect(),
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(counterpart_id): Path<String>,
) -> Result<Json<MarkReadDTO>, AppError> {
    // only the counterpart's messages to the caller flip; the caller's own stay untouched
    check_counterpart(&counterpart_id)?;

    let modified_count = state
        .msg
        .mark_read(&counterpart_id, &current_user.user_id)
        .await?;

    info!(modified_count, "Messages marked as read");
    Ok(Json(MarkReadDTO { modified_count }))
}

/// Non-realtime send: the message is persisted and shows up in history and
/// inbox, but nothing is pushed to live connections.
#[instrument(skip(state, current_user, payload), fields(user_id = %current_user.user_id))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    payload: Result<Json<SendMessageDTO>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    // malformed JSON is answered in the same error shape as validation failures
    let Json(body) = payload?;

    let message = state
        .msg
        .create(&body.into_create(&current_user.user_id))
        .await?;

    info!(message_id = message.id, "Message stored");
    Ok((StatusCode::CREATED, Json(MessageDTO::from(message))))
}

#[instrument(skip(state, current_user, message_id), fields(user_id = %current_user.user_id))]
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    message_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageDTO>, AppError> {
    let Path(message_id) = message_id?;
    // Non-participants get the same answer as for a missing id
    match state.msg.read(&message_id).await? {
        Some(message) if message.involves(&current_user.user_id) => {
            Ok(Json(MessageDTO::from(message)))
        }
        _ => {
            warn!(message_id, "Message not found or not visible");
            Err(AppError::not_found("Message not found"))
        }
    }
}
