//! Board topic registry for realtime fan-out.
//!
//! Each board is a topic. A WebSocket connection joins and leaves
//! topics explicitly; subscriptions are keyed by connection id and are
//! lost when the connection goes away. Delivery is at-most-once: a
//! subscriber whose channel has closed is dropped from the topic and
//! the event is not retried.

use std::collections::HashMap;

use axum::extract::ws::Message;
use tackboard_proto::event::BoardEvent;
use tackboard_proto::id::BoardId;
use tackboard_proto::wire::{self, ServerFrame};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Identifies one WebSocket connection within the registry.
pub type ConnId = Uuid;

/// In-memory directory of board subscriptions.
///
/// Thread-safe via [`RwLock`]. Topics with no remaining subscribers are
/// removed eagerly.
pub struct TopicRegistry {
    topics: RwLock<HashMap<BoardId, HashMap<ConnId, mpsc::UnboundedSender<Message>>>>,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes a connection to a board topic.
    ///
    /// Joining a topic the connection is already in replaces the stored
    /// sender; joins are idempotent from the subscriber's point of view.
    pub async fn join(&self, board: BoardId, conn: ConnId, sender: mpsc::UnboundedSender<Message>) {
        let mut topics = self.topics.write().await;
        topics.entry(board).or_default().insert(conn, sender);
    }

    /// Unsubscribes a connection from a board topic.
    ///
    /// Returns `true` if the connection was subscribed.
    pub async fn leave(&self, board: BoardId, conn: ConnId) -> bool {
        let mut topics = self.topics.write().await;
        let Some(subscribers) = topics.get_mut(&board) else {
            return false;
        };
        let removed = subscribers.remove(&conn).is_some();
        if subscribers.is_empty() {
            topics.remove(&board);
        }
        removed
    }

    /// Removes a connection from every topic it joined. Called on
    /// disconnect.
    pub async fn leave_all(&self, conn: ConnId) {
        let mut topics = self.topics.write().await;
        topics.retain(|_, subscribers| {
            subscribers.remove(&conn);
            !subscribers.is_empty()
        });
    }

    /// Number of subscribers currently in a board topic.
    pub async fn subscriber_count(&self, board: BoardId) -> usize {
        let topics = self.topics.read().await;
        topics.get(&board).map_or(0, HashMap::len)
    }

    /// Broadcasts an event to every subscriber of its board topic.
    ///
    /// Subscribers whose channel has closed are pruned from the topic.
    /// Returns the number of subscribers the event was handed to.
    pub async fn broadcast(&self, event: &BoardEvent) -> usize {
        let board = event.board_id();
        let frame = ServerFrame::Event(event.clone());
        let bytes = match wire::encode_server(&frame) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(board = %board, error = %e, "failed to encode event for broadcast");
                return 0;
            }
        };

        let mut topics = self.topics.write().await;
        let Some(subscribers) = topics.get_mut(&board) else {
            return 0;
        };

        let mut delivered = 0;
        subscribers.retain(|conn, sender| {
            if sender.send(Message::Binary(bytes.clone().into())).is_ok() {
                delivered += 1;
                true
            } else {
                tracing::debug!(board = %board, conn = %conn, "dropping dead subscriber");
                false
            }
        });
        if subscribers.is_empty() {
            topics.remove(&board);
        }
        delivered
    }
}
