//! WebSocket frame types for the realtime channel.
//!
//! After upgrading at `GET /ws`, a client subscribes to board topics by
//! sending [`ClientFrame::Join`] and unsubscribes with
//! [`ClientFrame::Leave`]. Subscriptions are per-connection and
//! ephemeral: they are lost on disconnect, and the server keeps no
//! catch-up log. A reconnecting client must re-fetch full board state
//! over HTTP before rejoining, or it will be operating on stale data.

use serde::{Deserialize, Serialize};

use crate::codec::CodecError;
use crate::event::BoardEvent;
use crate::id::BoardId;

/// Frames sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientFrame {
    /// Subscribe this connection to a board topic.
    ///
    /// The server acknowledges with [`ServerFrame::Joined`].
    Join {
        /// The board topic to join.
        board: BoardId,
    },
    /// Unsubscribe this connection from a board topic.
    Leave {
        /// The board topic to leave.
        board: BoardId,
    },
}

/// Frames sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerFrame {
    /// Acknowledges a [`ClientFrame::Join`].
    Joined {
        /// The board topic that was joined.
        board: BoardId,
    },
    /// A mutation event on a board this connection is subscribed to.
    Event(BoardEvent),
    /// The server could not process a frame.
    Error {
        /// Human-readable error description.
        reason: String,
    },
}

/// Encodes a [`ClientFrame`] into a byte vector using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the frame cannot be serialized.
pub fn encode_client(frame: &ClientFrame) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(frame).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`ClientFrame`] from a byte slice using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes cannot be deserialized.
pub fn decode_client(bytes: &[u8]) -> Result<ClientFrame, CodecError> {
    postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Encodes a [`ServerFrame`] into a byte vector using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the frame cannot be serialized.
pub fn encode_server(frame: &ServerFrame) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(frame).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`ServerFrame`] from a byte slice using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes cannot be deserialized.
pub fn decode_server(bytes: &[u8]) -> Result<ServerFrame, CodecError> {
    postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}
