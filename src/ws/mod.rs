//! WebSocket Module - Live-connection boundary
//!
//! - HTTP -> WebSocket upgrade for authenticated users
//! - Per-connection reader/writer tasks (split socket, bounded outbound queue)
//! - Dispatch of client events to the messaging core
//! - Presence registry mapping users to their live connection

pub mod connection;
pub mod event_handlers;
pub mod presence;

pub use connection::handle_socket;
pub use presence::{ConnectionHandle, ConnectionId, DeliveryOutcome, PresenceRegistry};

use crate::{AppState, entities::CurrentUser};
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Minimum spacing between two inbound frames of one connection
pub const RATE_LIMITER_MILLIS: u64 = 5;

/// Entry point for WebSocket upgrade requests
/// 1. The caller was authenticated by the middleware
/// 2. Upgrade HTTP -> WebSocket
/// 3. Hand the socket to handle_socket
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, current_user))
}
