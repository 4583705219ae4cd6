//! ConversationRepository - Per-user inbox derived from the message log
//!
//! Nothing is materialized: every call recomputes the view from the current
//! contents of `messages`, so a mark-read done a moment earlier is always
//! reflected. The query is served by the sender/receiver indexes instead of a
//! full table scan.

use super::bounded;
use crate::core::ChatError;
use crate::dtos::{ConversationDTO, validate_participant_id};
use crate::entities::message::millis_to_datetime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::time::Duration;
use tracing::{debug, instrument};

// latest message per counterpart via ROW_NUMBER, unread count via a windowed SUM
const CONVERSATIONS_QUERY: &str = r#"
    WITH mine AS (
        SELECT
            id,
            body,
            created_at,
            receiver_id,
            is_read,
            CASE WHEN sender_id = ? THEN receiver_id ELSE sender_id END AS counterpart_id
        FROM messages
        WHERE sender_id = ? OR receiver_id = ?
    ),
    ranked AS (
        SELECT
            id,
            counterpart_id,
            body,
            created_at,
            ROW_NUMBER() OVER (
                PARTITION BY counterpart_id
                ORDER BY created_at DESC, id DESC
            ) AS position,
            SUM(CASE WHEN receiver_id = ? AND is_read = 0 THEN 1 ELSE 0 END) OVER (
                PARTITION BY counterpart_id
            ) AS unread_count
        FROM mine
    )
    SELECT counterpart_id, body, created_at, unread_count
    FROM ranked
    WHERE position = 1
    ORDER BY created_at DESC, id DESC
"#;

pub struct ConversationRepository {
    connection_pool: SqlitePool,
    timeout: Duration,
}

fn conversation_from_row(row: &SqliteRow) -> Result<ConversationDTO, sqlx::Error> {
    Ok(ConversationDTO {
        counterpart_id: row.try_get("counterpart_id")?,
        last_message_body: row.try_get("body")?,
        last_message_time: millis_to_datetime(row.try_get("created_at")?)?,
        unread_count: row.try_get("unread_count")?,
    })
}

impl ConversationRepository {
    pub fn new(connection_pool: SqlitePool, timeout: Duration) -> Self {
        Self {
            connection_pool,
            timeout,
        }
    }

    /// Everyone `user_id` has exchanged messages with, most recent first,
    /// with the last message and the number of messages still unread by `user_id`.
    #[instrument(skip(self))]
    pub async fn conversations_for(&self, user_id: &str) -> Result<Vec<ConversationDTO>, ChatError> {
        validate_participant_id(user_id)?;

        let rows = bounded(
            self.timeout,
            sqlx::query(CONVERSATIONS_QUERY)
                .bind(user_id)
                .bind(user_id)
                .bind(user_id)
                .bind(user_id)
                .fetch_all(&self.connection_pool),
        )
        .await?;

        let conversations = rows
            .iter()
            .map(conversation_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = conversations.len(), "Conversations aggregated");
        Ok(conversations)
    }
}
