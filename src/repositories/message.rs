//! MessageRepository - Durable, append-mostly log of chat messages

use super::{Create, Read, bounded};
use crate::core::ChatError;
use crate::dtos::{CreateMessageDTO, validate_participant_id};
use crate::entities::ChatMessage;
use crate::entities::message::millis_to_datetime;
use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const SELECT_MESSAGE: &str = r#"
    SELECT id, sender_id, receiver_id, body, item_ref, is_read, created_at
    FROM messages
"#;

// MESSAGE REPO
pub struct MessageRepository {
    connection_pool: SqlitePool,
    timeout: Duration,
    /// Last `created_at` handed out (epoch millis). Held for the whole insert
    /// so appends are serialized and timestamps never run backwards.
    /// `None` until the first append seeds it from the stored maximum.
    last_created_at: Mutex<Option<i64>>,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool, timeout: Duration) -> Self {
        Self {
            connection_pool,
            timeout,
            last_created_at: Mutex::new(None),
        }
    }

    /// Every message exchanged by the two users, in either direction,
    /// oldest first (ties broken by id).
    ///
    /// An empty vector means the users never talked; it is not an error.
    #[instrument(skip(self))]
    pub async fn history(&self, user_a: &str, user_b: &str) -> Result<Vec<ChatMessage>, ChatError> {
        validate_participant_id(user_a)?;
        validate_participant_id(user_b)?;

        let query = format!(
            r#"{SELECT_MESSAGE}
            WHERE (sender_id = ? AND receiver_id = ?)
               OR (sender_id = ? AND receiver_id = ?)
            ORDER BY created_at ASC, id ASC
            "#
        );
        let messages = bounded(
            self.timeout,
            sqlx::query_as::<_, ChatMessage>(&query)
                .bind(user_a)
                .bind(user_b)
                .bind(user_b)
                .bind(user_a)
                .fetch_all(&self.connection_pool),
        )
        .await?;

        debug!(count = messages.len(), "History loaded");
        Ok(messages)
    }

    /// Flags as read every unread message sent by `from_user_id` to `to_user_id`.
    ///
    /// Single conditional UPDATE: concurrent callers never count the same
    /// message twice, and a repeated call returns 0.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, from_user_id: &str, to_user_id: &str) -> Result<u64, ChatError> {
        validate_participant_id(from_user_id)?;
        validate_participant_id(to_user_id)?;

        let result = bounded(
            self.timeout,
            sqlx::query(
                r#"
                UPDATE messages
                SET is_read = 1
                WHERE sender_id = ? AND receiver_id = ? AND is_read = 0
                "#,
            )
            .bind(from_user_id)
            .bind(to_user_id)
            .execute(&self.connection_pool),
        )
        .await?;

        debug!(updated = result.rows_affected(), "Messages marked as read");
        Ok(result.rows_affected())
    }

    /// Inserts under the append lock and returns `(id, created_at)`.
    ///
    /// The timestamp floor starts from the newest stored message, so a wall
    /// clock that moved backwards across a restart cannot place a new message
    /// before older ones.
    async fn append(&self, data: &CreateMessageDTO) -> Result<(i64, i64), sqlx::Error> {
        let mut last_created_at = self.last_created_at.lock().await;
        let floor = match *last_created_at {
            Some(millis) => millis,
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(created_at), 0) FROM messages")
                    .fetch_one(&self.connection_pool)
                    .await?
            }
        };
        let created_at = Utc::now().timestamp_millis().max(floor);

        let result = sqlx::query(
            r#"
            INSERT INTO messages (sender_id, receiver_id, body, item_ref, is_read, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&data.sender_id)
        .bind(&data.receiver_id)
        .bind(&data.body)
        .bind(&data.item_ref)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await?;

        *last_created_at = Some(created_at);
        Ok((result.last_insert_rowid(), created_at))
    }
}

impl Create<ChatMessage, CreateMessageDTO> for MessageRepository {
    #[instrument(skip(self, data), fields(sender_id = %data.sender_id, receiver_id = %data.receiver_id))]
    async fn create(&self, data: &CreateMessageDTO) -> Result<ChatMessage, ChatError> {
        let data = data.clone().into_validated()?;

        // waiting for the append lock counts against the same deadline as the insert
        let (id, created_at) = bounded(self.timeout, self.append(&data)).await?;
        debug!(message_id = id, "Message persisted");

        Ok(ChatMessage {
            id,
            sender_id: data.sender_id,
            receiver_id: data.receiver_id,
            body: data.body,
            item_ref: data.item_ref,
            is_read: false,
            created_at: millis_to_datetime(created_at)?,
        })
    }
}

impl Read<ChatMessage, i64> for MessageRepository {
    async fn read(&self, id: &i64) -> Result<Option<ChatMessage>, ChatError> {
        let query = format!("{SELECT_MESSAGE} WHERE id = ?");
        bounded(
            self.timeout,
            sqlx::query_as::<_, ChatMessage>(&query)
                .bind(id)
                .fetch_optional(&self.connection_pool),
        )
        .await
    }
}
