//! Integration tests for the /chat endpoints

mod common;

#[cfg(test)]
mod chat_tests {
    use super::common::*;
    use axum_test::TestServer;
    use axum_test::http::{HeaderName, StatusCode};
    use marketchat::entities::UserRole;
    use serde_json::{Value, json};

    fn auth() -> HeaderName {
        HeaderName::from_static("authorization")
    }

    async fn server() -> TestServer {
        create_test_server(create_test_state().await)
    }

    async fn send(server: &TestServer, from: &str, to: &str, body: &str) -> Value {
        let response = server
            .post("/chat")
            .add_header(auth(), bearer(from, UserRole::Buyer))
            .json(&json!({ "receiver_id": to, "body": body }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    // ============================================================
    // Authentication
    // ============================================================

    #[tokio::test]
    async fn test_health_check() {
        let server = server().await;
        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text("Server is running!");
    }

    #[tokio::test]
    async fn test_missing_token_is_forbidden() {
        let server = server().await;
        server.get("/chat/conversations").await.assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let server = server().await;
        server
            .get("/chat/conversations")
            .add_header(auth(), "Bearer not-a-token".to_string())
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_unauthorized() {
        let server = server().await;
        let token = marketchat::core::encode_jwt("alice", UserRole::Buyer, "another-secret")
            .expect("token");
        server
            .get("/chat/conversations")
            .add_header(auth(), format!("Bearer {}", token))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_token_query_parameter_is_accepted() {
        let server = server().await;
        let token = create_test_jwt("alice", UserRole::Buyer);
        server
            .get(&format!("/chat/conversations?token={}", token))
            .await
            .assert_status_ok();
    }

    // ============================================================
    // Marketplace scenario
    // ============================================================

    #[tokio::test]
    async fn test_buyer_farmer_conversation() {
        let server = server().await;

        // Alice asks about a listing
        let response = server
            .post("/chat")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .json(&json!({
                "receiver_id": "bob",
                "body": "Is this still available?",
                "item_ref": "tomatoes-42"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let sent: Value = response.json();
        assert_eq!(sent["sender_id"], "alice");
        assert_eq!(sent["item_ref"], "tomatoes-42");
        assert_eq!(sent["is_read"], false);

        let history: Vec<Value> = server
            .get("/chat/bob")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .json();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["body"], "Is this still available?");
        assert_eq!(history[0]["is_read"], false);

        // Bob opens the conversation
        let opened: Value = server
            .post("/chat/open/alice")
            .add_header(auth(), bearer("bob", UserRole::Farmer))
            .await
            .json();
        assert_eq!(opened["marked_read"], 1);
        assert_eq!(opened["messages"][0]["is_read"], true);

        let inbox: Vec<Value> = server
            .get("/chat/conversations")
            .add_header(auth(), bearer("bob", UserRole::Farmer))
            .await
            .json();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["counterpart_id"], "alice");
        assert_eq!(inbox[0]["unread_count"], 0);

        // Bob replies
        send(&server, "bob", "alice", "Yes, 5kg left").await;

        let inbox: Vec<Value> = server
            .get("/chat/conversations")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .json();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["counterpart_id"], "bob");
        assert_eq!(inbox[0]["last_message_body"], "Yes, 5kg left");
        assert_eq!(inbox[0]["unread_count"], 1);
    }

    #[tokio::test]
    async fn test_inbox_orders_most_recent_first() {
        let server = server().await;
        send(&server, "bob", "alice", "tomatoes?").await;
        send(&server, "carol", "alice", "potatoes?").await;
        send(&server, "alice", "carol", "sure").await;

        let inbox: Vec<Value> = server
            .get("/chat/conversations")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .json();
        let counterparts: Vec<&str> = inbox
            .iter()
            .map(|c| c["counterpart_id"].as_str().expect("counterpart"))
            .collect();
        assert_eq!(counterparts, vec!["carol", "bob"]);
        assert_eq!(inbox[0]["last_message_body"], "sure");
        assert_eq!(inbox[0]["unread_count"], 1);
        assert_eq!(inbox[1]["unread_count"], 1);
    }

    #[tokio::test]
    async fn test_empty_history_and_inbox() {
        let server = server().await;
        let history: Vec<Value> = server
            .get("/chat/nobody")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .json();
        assert!(history.is_empty());

        let inbox: Vec<Value> = server
            .get("/chat/conversations")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .json();
        assert!(inbox.is_empty());
    }

    // ============================================================
    // Read state
    // ============================================================

    #[tokio::test]
    async fn test_mark_read_is_directional_and_idempotent() {
        let server = server().await;
        send(&server, "alice", "bob", "one").await;
        send(&server, "alice", "bob", "two").await;
        send(&server, "bob", "alice", "three").await;

        let first: Value = server
            .put("/chat/mark-read/alice")
            .add_header(auth(), bearer("bob", UserRole::Farmer))
            .await
            .json();
        assert_eq!(first["modified_count"], 2);

        let second: Value = server
            .put("/chat/mark-read/alice")
            .add_header(auth(), bearer("bob", UserRole::Farmer))
            .await
            .json();
        assert_eq!(second["modified_count"], 0);

        // Bob's own message to alice is untouched
        let inbox: Vec<Value> = server
            .get("/chat/conversations")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .json();
        assert_eq!(inbox[0]["unread_count"], 1);
    }

    // ============================================================
    // Validation
    // ============================================================

    #[tokio::test]
    async fn test_blank_body_is_rejected() {
        let server = server().await;
        let response = server
            .post("/chat")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .json(&json!({ "receiver_id": "bob", "body": "   " }))
            .await;
        response.assert_status_bad_request();
        let error: Value = response.json();
        assert_eq!(error["error"], "Validation error");
        assert_eq!(error["details"], "Message body cannot be empty");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let server = server().await;
        server
            .post("/chat")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .json(&json!({ "receiver_id": "bob", "body": "x".repeat(5001) }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_missing_receiver_is_rejected() {
        let server = server().await;
        server
            .post("/chat")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .json(&json!({ "body": "hello" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_self_message_is_rejected() {
        let server = server().await;
        let response = server
            .post("/chat")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .json(&json!({ "receiver_id": "alice", "body": "note to self" }))
            .await;
        response.assert_status_bad_request();

        let history: Vec<Value> = server
            .get("/chat/alice")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .json();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_counterpart_is_rejected() {
        let server = server().await;
        server
            .get("/chat/bad.id")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .assert_status_bad_request();
        server
            .put("/chat/mark-read/bad.id")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_malformed_json_body_uses_error_shape() {
        let server = server().await;
        let response = server
            .post("/chat")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .text("{ \"receiver_id\": \"bob\", ")
            .content_type("application/json")
            .await;
        response.assert_status_bad_request();
        let error: Value = response.json();
        assert_eq!(error["error"], "Invalid request");
        assert!(error["details"].is_string());
    }

    // ============================================================
    // Message by id
    // ============================================================

    #[tokio::test]
    async fn test_message_by_id_visible_to_participants_only() {
        let server = server().await;
        let sent = send(&server, "alice", "bob", "private").await;
        let id = sent["id"].as_i64().expect("message id");

        for user in ["alice", "bob"] {
            let found: Value = server
                .get(&format!("/chat/message/{}", id))
                .add_header(auth(), bearer(user, UserRole::Buyer))
                .await
                .json();
            assert_eq!(found["body"], "private");
        }

        server
            .get(&format!("/chat/message/{}", id))
            .add_header(auth(), bearer("carol", UserRole::Buyer))
            .await
            .assert_status_not_found();
        server
            .get("/chat/message/999999")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_non_numeric_message_id_uses_error_shape() {
        let server = server().await;
        let response = server
            .get("/chat/message/abc")
            .add_header(auth(), bearer("alice", UserRole::Buyer))
            .await;
        response.assert_status_bad_request();
        let error: Value = response.json();
        assert_eq!(error["error"], "Invalid request");
    }
}
