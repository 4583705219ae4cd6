//! Repositories module - Storage access for the messaging core
//!
//! Every repository owns a clone of the SQLite pool and a per-call timeout.
//!
//! Queries are written with the runtime API (`sqlx::query` + `bind`) rather
//! than the `query!` macros, so building the crate never needs a live
//! database. Rows are decoded through `FromRow` implementations on the
//! entities.
//!
//! Number of rows  | Method
//! ----------------|-----------------------------------------------
//! none            | `.execute(..)`      -> rows_affected / last_insert_rowid
//! zero or one     | `.fetch_optional(..)`
//! exactly one     | `.fetch_one(..)`    (aggregates)
//! many            | `.fetch_all(..)`

pub mod conversation;
pub mod message;
pub mod traits;

pub use traits::{Create, Read};

pub use conversation::ConversationRepository;
pub use message::MessageRepository;

use crate::core::ChatError;
use std::future::Future;
use std::time::Duration;

/// Runs a store call under `limit`; elapsing counts as a transient failure.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, ChatError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(ChatError::from),
        Err(_) => Err(ChatError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stalled_store_call_times_out() {
        let stalled = std::future::pending::<Result<(), sqlx::Error>>();
        let err = bounded(Duration::from_millis(20), stalled)
            .await
            .expect_err("should time out");
        assert!(matches!(err, ChatError::Timeout));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn store_errors_are_translated() {
        let failing = async { Err::<(), _>(sqlx::Error::PoolClosed) };
        let err = bounded(Duration::from_secs(1), failing).await.expect_err("should fail");
        assert!(matches!(err, ChatError::TransientStore(_)));
    }
}
