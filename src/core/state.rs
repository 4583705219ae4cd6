//! Application State - Shared state of the chat service
//!
//! Holds the message store, the conversation aggregator, the presence
//! registry and the runtime settings used by every route and socket task.

use crate::repositories::{ConversationRepository, MessageRepository};
use crate::ws::presence::PresenceRegistry;
use sqlx::SqlitePool;
use std::time::Duration;

/// Runtime knobs of the messaging core.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Upper bound for any single message store call
    pub store_timeout: Duration,
    /// Size of each live connection's outbound queue
    pub outbound_queue_capacity: usize,
    /// A live connection that stays silent this long is closed
    pub ws_idle_timeout: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            outbound_queue_capacity: 64,
            ws_idle_timeout: Duration::from_secs(300),
        }
    }
}

/// Global state shared by all routes, middleware and socket tasks
pub struct AppState {
    /// Durable message log
    pub msg: MessageRepository,

    /// Per-user inbox view derived from the message log
    pub conversations: ConversationRepository,

    /// Secret key used to verify identity provider tokens
    pub jwt_secret: String,

    /// Users currently reachable through a live connection
    /// Key: user_id, Value: handle of the connection's outbound queue
    pub presence: PresenceRegistry,

    pub settings: ChatSettings,
}

impl AppState {
    /// Builds the state around an already migrated pool.
    ///
    /// # Arguments
    /// * `pool` - Shared SQLite connection pool
    /// * `jwt_secret` - Key used to verify identity provider tokens
    /// * `settings` - Timeouts and queue sizes
    pub fn new(pool: SqlitePool, jwt_secret: String, settings: ChatSettings) -> Self {
        Self {
            msg: MessageRepository::new(pool.clone(), settings.store_timeout),
            conversations: ConversationRepository::new(pool, settings.store_timeout),
            jwt_secret,
            presence: PresenceRegistry::new(),
            settings,
        }
    }
}
