//! Board-scoped realtime events.
//!
//! Every mutation on a board emits one [`BoardEvent`] to the board's
//! topic. Payloads carry the canonical post-mutation entity, or the
//! minimal identifying tuple for deletes. Events are postcard-encoded
//! and carried inside [`crate::wire::ServerFrame::Event`] on WebSocket
//! binary frames.
//!
//! Delivery is best-effort at-most-once per subscriber, in persistence
//! commit order; there is no replay for subscribers that reconnect.

use serde::{Deserialize, Serialize};

use crate::codec::CodecError;
use crate::id::{BoardId, ListId, TaskId};
use crate::model::{Board, List, ListPlacement, Task, TaskPlacement, UserProfile};

/// A mutation event broadcast to every subscriber of a board topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// A task was created.
    TaskCreated(Task),
    /// A task's fields changed (including assignee toggles).
    TaskUpdated(Task),
    /// A task was deleted.
    TaskDeleted {
        /// The deleted task.
        task: TaskId,
        /// The list it was in.
        list: ListId,
        /// The board it was on.
        board: BoardId,
    },
    /// A reorder batch was committed; carries the full placement set the
    /// reconciler applied so subscribers can patch local state directly.
    TasksReordered {
        /// The board the reorder happened on.
        board: BoardId,
        /// Every placement the caller submitted.
        placements: Vec<TaskPlacement>,
    },
    /// A list was created.
    ListCreated(List),
    /// A list was renamed.
    ListUpdated(List),
    /// A list was deleted; its tasks cascade away with it.
    ListDeleted {
        /// The deleted list.
        list: ListId,
        /// The board it was on.
        board: BoardId,
    },
    /// Lists on a board were reordered.
    ListsReordered {
        /// The board the reorder happened on.
        board: BoardId,
        /// Every placement the caller submitted.
        placements: Vec<ListPlacement>,
    },
    /// A board's title, description, or background changed.
    BoardUpdated(Board),
    /// A board was deleted along with all of its contents.
    BoardDeleted {
        /// The deleted board.
        board: BoardId,
    },
    /// A member was added to a board.
    MemberAdded {
        /// The board with its updated member set.
        board: Board,
        /// The member that was added.
        member: UserProfile,
    },
}

impl BoardEvent {
    /// Returns the board this event is scoped to, i.e. the topic it
    /// should be fanned out on.
    #[must_use]
    pub fn board_id(&self) -> BoardId {
        match self {
            Self::TaskCreated(task) | Self::TaskUpdated(task) => task.board,
            Self::ListCreated(list) | Self::ListUpdated(list) => list.board,
            Self::BoardUpdated(board) => board.id,
            Self::MemberAdded { board, .. } => board.id,
            Self::TaskDeleted { board, .. }
            | Self::TasksReordered { board, .. }
            | Self::ListDeleted { board, .. }
            | Self::ListsReordered { board, .. }
            | Self::BoardDeleted { board } => *board,
        }
    }
}

/// Encodes a [`BoardEvent`] into a byte vector using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the event cannot be serialized.
pub fn encode(event: &BoardEvent) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(event).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`BoardEvent`] from a byte slice using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes cannot be deserialized.
pub fn decode(bytes: &[u8]) -> Result<BoardEvent, CodecError> {
    postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}
