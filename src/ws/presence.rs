//! Presence Registry - which live connection currently speaks for which user
//!
//! Process-local and lost on restart. A user maps to at most one connection
//! (the latest `join` wins); a connection is removed by its handle id because
//! the teardown path does not necessarily know which user it served.

use crate::dtos::ServerEvent;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, instrument, warn};

pub type ConnectionId = u64;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Result of a best-effort push. None of these is an error for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Queued on the connection's outbound queue
    Delivered,
    /// No live connection registered for the user
    Offline,
    /// Outbound queue full: the new event was dropped
    QueueFull,
    /// The connection is shutting down
    Closed,
    /// Not pushed: the signal was addressed to its own sender
    Ignored,
}

/// Addressable end of a live connection: a unique id plus the sending half
/// of its bounded outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: Sender<Arc<ServerEvent>>,
}

impl ConnectionHandle {
    pub fn new(outbound: Sender<Arc<ServerEvent>>) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            outbound,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Non-blocking push; a slow client never backpressures the caller.
    pub fn push(&self, event: Arc<ServerEvent>) -> DeliveryOutcome {
        match self.outbound.try_send(event) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(TrySendError::Full(event)) => {
                warn!(
                    connection_id = self.id,
                    event = event.name(),
                    "Outbound queue full, dropping event"
                );
                DeliveryOutcome::QueueFull
            }
            Err(TrySendError::Closed(event)) => {
                debug!(
                    connection_id = self.id,
                    event = event.name(),
                    "Connection closed, event skipped"
                );
                DeliveryOutcome::Closed
            }
        }
    }
}

pub struct PresenceRegistry {
    connections: DashMap<String, ConnectionHandle>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        PresenceRegistry {
            connections: DashMap::new(),
        }
    }

    /// Registers `handle` for `user_id`, returning the handle it superseded.
    #[instrument(skip(self, handle), fields(connection_id = handle.id()))]
    pub fn join(&self, user_id: &str, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let previous = self.connections.insert(user_id.to_string(), handle);
        info!(
            superseded = previous.is_some(),
            online = self.connections.len(),
            "User joined"
        );
        previous
    }

    /// Removes the entry served by `connection_id`, if it is still the
    /// current one, and returns the user it belonged to.
    ///
    /// A stale connection of a user who already reconnected finds nothing to
    /// remove, so the newer `join` survives.
    #[instrument(skip(self))]
    pub fn leave(&self, connection_id: ConnectionId) -> Option<String> {
        let user_id = self
            .connections
            .iter()
            .find(|entry| entry.value().id() == connection_id)
            .map(|entry| entry.key().clone())?;

        // re-checked under the shard lock: a join may have raced the scan
        let removed = self
            .connections
            .remove_if(&user_id, |_, handle| handle.id() == connection_id)
            .map(|(user_id, _)| user_id);

        if let Some(user_id) = &removed {
            info!(user_id = %user_id, "User left");
        }
        removed
    }

    pub fn lookup(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.connections.get(user_id).map(|entry| entry.value().clone())
    }

    /// Pushes to the user's live connection if there is one.
    pub fn push_to(&self, user_id: &str, event: Arc<ServerEvent>) -> DeliveryOutcome {
        // clone first so no map lock is held while pushing
        match self.lookup(user_id) {
            Some(handle) => handle.push(event),
            None => {
                debug!(user_id, event = event.name(), "User offline, event not pushed");
                DeliveryOutcome::Offline
            }
        }
    }

    pub fn online_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.connections.contains_key(user_id)
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
