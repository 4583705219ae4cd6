#![allow(dead_code)]

use axum_test::TestServer;
use marketchat::core::db::connect_in_memory;
use marketchat::core::{AppState, ChatSettings, encode_jwt};
use marketchat::entities::UserRole;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const TEST_JWT_SECRET: &str = "test-secret-used-only-by-integration-tests";

/// Builds an AppState around a private in-memory message store
pub async fn create_test_state() -> Arc<AppState> {
    let pool = connect_in_memory()
        .await
        .expect("Failed to open in-memory store");
    Arc::new(AppState::new(
        pool,
        TEST_JWT_SECRET.to_string(),
        ChatSettings::default(),
    ))
}

/// Creates a TestServer for REST tests
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = marketchat::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Serves the router on a real listener, for WebSocket clients
pub async fn spawn_test_app(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let app = marketchat::create_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    addr
}

/// Token as the identity provider would issue it, valid for 24 hours
pub fn create_test_jwt(user_id: &str, role: UserRole) -> String {
    encode_jwt(user_id, role, TEST_JWT_SECRET).expect("Failed to create JWT token")
}

pub fn bearer(user_id: &str, role: UserRole) -> String {
    format!("Bearer {}", create_test_jwt(user_id, role))
}
