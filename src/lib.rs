//! Marketplace chat server - library root, exposes the modules for the binary and the tests

pub mod core;
pub mod dtos;
pub mod entities;
pub mod messaging;
pub mod repositories;
pub mod services;
pub mod ws;

// Re-exports of the main types
pub use crate::core::{AppError, AppState, ChatError, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, get, post, put},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    use crate::core::authentication_middleware;
    use ws::ws_handler;

    Router::new()
        .route("/", get(root))
        .nest("/chat", configure_chat_routes(state.clone()))
        .route(
            "/ws",
            any(ws_handler).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Chat routes; the viewer is always the authenticated caller
fn configure_chat_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", post(send_message))
        .route("/conversations", get(list_conversations))
        .route("/message/{message_id}", get(get_message))
        .route("/open/{counterpart_id}", post(open_conversation))
        .route("/mark-read/{counterpart_id}", put(mark_read))
        .route("/{counterpart_id}", get(get_history))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
