//! Core data model: boards, lists, tasks, and the activity log.
//!
//! Positions are plain sparse integer ranks scoped to the parent
//! collection (tasks within a list, lists within a board). Canonical
//! ordering is always derived by a stable ascending sort on `position`;
//! equal ranks may exist transiently mid-reorder and are broken by the
//! stable order of the backing collection.
//!
//! Timestamps throughout are milliseconds since the Unix epoch.

use serde::{Deserialize, Serialize};

use crate::id::{ActivityId, BoardId, ListId, TaskId, UserId};

/// Maximum allowed board title length in characters.
pub const MAX_BOARD_TITLE_LENGTH: usize = 100;
/// Maximum allowed list title length in characters.
pub const MAX_LIST_TITLE_LENGTH: usize = 100;
/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 200;
/// Maximum allowed task description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Default board background color.
pub const DEFAULT_BACKGROUND: &str = "#6366f1";

/// Task priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Normal priority (the default for new tasks).
    #[default]
    Medium,
    /// High priority.
    High,
    /// Needs attention now.
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Public projection of a user account, safe to share with other members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Optional avatar URL.
    pub avatar: Option<String>,
}

/// A collaborative board: the top-level workspace containing lists and tasks.
///
/// Invariant: `owner` is always present in `members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Board id.
    pub id: BoardId,
    /// Board title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// The user who created the board; only the owner may update or
    /// delete it or add members.
    pub owner: UserId,
    /// Everyone with access to the board, owner included.
    pub members: Vec<UserId>,
    /// Background color (CSS color string).
    pub background: String,
    /// Creation time (millis since epoch).
    pub created_at: u64,
    /// Last mutation time (millis since epoch).
    pub updated_at: u64,
}

impl Board {
    /// Returns whether the given user is a member of this board.
    #[must_use]
    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }
}

/// An ordered column of tasks within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// List id.
    pub id: ListId,
    /// List title.
    pub title: String,
    /// Owning board.
    pub board: BoardId,
    /// Sparse rank among the board's lists.
    pub position: i64,
    /// Creation time (millis since epoch).
    pub created_at: u64,
    /// Last mutation time (millis since epoch).
    pub updated_at: u64,
}

/// A unit of work within a list.
///
/// `board` is denormalized and must always equal the board of the
/// referenced `list` (lists never move between boards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task id.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Owning list.
    pub list: ListId,
    /// Owning board (denormalized from the list).
    pub board: BoardId,
    /// Sparse rank among the list's tasks.
    pub position: i64,
    /// Assigned users; always a subset of the board's members.
    pub assignees: Vec<UserId>,
    /// Priority level.
    pub priority: Priority,
    /// Optional due date (millis since epoch).
    pub due_date: Option<u64>,
    /// Free-form labels.
    pub labels: Vec<String>,
    /// Creation time (millis since epoch).
    pub created_at: u64,
    /// Last mutation time (millis since epoch).
    pub updated_at: u64,
}

/// One entry in a task reorder batch: where a task should end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlacement {
    /// The task being placed.
    pub task: TaskId,
    /// Destination list (may equal the current list).
    pub list: ListId,
    /// New rank within the destination list.
    pub position: i64,
}

/// One entry in a list reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPlacement {
    /// The list being placed.
    pub list: ListId,
    /// New rank within the board.
    pub position: i64,
}

/// The kind of action an activity entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// A board was created.
    #[serde(rename = "board.created")]
    BoardCreated,
    /// A board's title, description, or background changed.
    #[serde(rename = "board.updated")]
    BoardUpdated,
    /// A list was created.
    #[serde(rename = "list.created")]
    ListCreated,
    /// A list was renamed.
    #[serde(rename = "list.updated")]
    ListUpdated,
    /// A list was deleted (its tasks cascade away with it).
    #[serde(rename = "list.deleted")]
    ListDeleted,
    /// A task was created.
    #[serde(rename = "task.created")]
    TaskCreated,
    /// A task's fields changed.
    #[serde(rename = "task.updated")]
    TaskUpdated,
    /// A task was deleted.
    #[serde(rename = "task.deleted")]
    TaskDeleted,
    /// Tasks were reordered or moved between lists.
    #[serde(rename = "task.moved")]
    TaskMoved,
    /// A member joined the board.
    #[serde(rename = "member.added")]
    MemberAdded,
    /// A member was removed from the board.
    #[serde(rename = "member.removed")]
    MemberRemoved,
    /// A user was assigned to a task.
    #[serde(rename = "task.assigned")]
    TaskAssigned,
    /// A user was unassigned from a task.
    #[serde(rename = "task.unassigned")]
    TaskUnassigned,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BoardCreated => "board.created",
            Self::BoardUpdated => "board.updated",
            Self::ListCreated => "list.created",
            Self::ListUpdated => "list.updated",
            Self::ListDeleted => "list.deleted",
            Self::TaskCreated => "task.created",
            Self::TaskUpdated => "task.updated",
            Self::TaskDeleted => "task.deleted",
            Self::TaskMoved => "task.moved",
            Self::MemberAdded => "member.added",
            Self::MemberRemoved => "member.removed",
            Self::TaskAssigned => "task.assigned",
            Self::TaskUnassigned => "task.unassigned",
        };
        write!(f, "{s}")
    }
}

/// Structured detail payload attached to an activity entry.
///
/// All fields are optional; each action kind fills in the ones that
/// make sense for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDetails {
    /// Title of the entity acted on.
    pub title: Option<String>,
    /// Task acted on, if any.
    pub task: Option<TaskId>,
    /// List acted on, if any.
    pub list: Option<ListId>,
    /// Title of the list a task was created in.
    pub list_title: Option<String>,
    /// Number of tasks touched by a reorder.
    pub task_count: Option<u32>,
    /// Name of the member added or removed.
    pub member_name: Option<String>,
    /// Email of the member added or removed.
    pub member_email: Option<String>,
    /// The user assigned or unassigned.
    pub target_user: Option<UserId>,
}

/// An immutable, append-only record of a board-scoped action.
///
/// Activity entries are never updated; they are deleted only when their
/// board cascades away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Entry id.
    pub id: ActivityId,
    /// The board the action happened on.
    pub board: BoardId,
    /// The acting user.
    pub user: UserId,
    /// What happened.
    pub action: ActionKind,
    /// Action-specific detail payload.
    pub details: ActivityDetails,
    /// When it happened (millis since epoch).
    pub created_at: u64,
}
