//! Services module - HTTP handlers
//!
//! REST is the retrieval boundary of the chat core: inbox, history, read
//! state and a non-realtime send. Live traffic goes through `crate::ws`.

pub mod chat;

pub use chat::{get_history, get_message, list_conversations, mark_read, open_conversation, send_message};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
