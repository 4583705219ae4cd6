//! Message entity - The single persisted chat record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub body: String,
    // reference into the catalog, never denormalized item data
    pub item_ref: Option<String>,
    // only ever flips false -> true
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// True when `user_id` is the sender or the receiver.
    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

/// Converts the integer millisecond column back into a UTC timestamp.
pub(crate) fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "created_at".to_string(),
        source: format!("timestamp out of range: {}", millis).into(),
    })
}

// created_at is stored as epoch millis, so the row is decoded by hand
impl<'r> FromRow<'r, SqliteRow> for ChatMessage {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            sender_id: row.try_get("sender_id")?,
            receiver_id: row.try_get("receiver_id")?,
            body: row.try_get("body")?,
            item_ref: row.try_get("item_ref")?,
            is_read: row.try_get("is_read")?,
            created_at: millis_to_datetime(row.try_get("created_at")?)?,
        })
    }
}
