//! Request and response bodies for the HTTP API.
//!
//! These are shared between the server handlers and the client library
//! so both sides agree on the JSON shapes. Field names serialize in
//! snake_case, matching the model types.

use serde::{Deserialize, Serialize};

use crate::id::{BoardId, UserId};
use crate::model::{
    Activity, Board, List, ListPlacement, Priority, Task, TaskPlacement, UserProfile,
};

// ---- auth ----

/// Body for `POST /api/auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Email address; must be unique across accounts.
    pub email: String,
    /// Plain-text password, hashed server-side.
    pub password: String,
}

/// Body for `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Response for signup and login: a bearer token plus the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Opaque session token, sent back as `Authorization: Bearer <token>`.
    pub token: String,
    /// The authenticated user's profile.
    pub user: UserProfile,
}

/// Response for `GET /api/auth/me` and single-user lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    /// The requested profile.
    pub user: UserProfile,
}

/// Response for `GET /api/auth/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersResponse {
    /// Matching profiles.
    pub users: Vec<UserProfile>,
}

// ---- boards ----

/// Body for `POST /api/boards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBoardRequest {
    /// Board title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional background color; defaults server-side when absent.
    #[serde(default)]
    pub background: Option<String>,
}

/// Body for `PUT /api/boards/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBoardRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New background color.
    #[serde(default)]
    pub background: Option<String>,
}

/// Body for `POST /api/boards/{id}/members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMemberRequest {
    /// Email of the account to add.
    pub email: String,
}

/// Response wrapping a single board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardResponse {
    /// The board.
    pub board: Board,
}

/// One page of the caller's boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardsPage {
    /// Boards on this page, most recently updated first.
    pub boards: Vec<Board>,
    /// Paging info.
    pub pagination: Pagination,
}

/// Full board detail: the board plus everything needed to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDetail {
    /// The board.
    pub board: Board,
    /// Resolved member profiles.
    pub members: Vec<UserProfile>,
    /// The board's lists in position order.
    pub lists: Vec<List>,
    /// Every task on the board, in (list, position) order.
    pub tasks: Vec<Task>,
}

// ---- lists ----

/// Body for `POST /api/boards/{id}/lists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateListRequest {
    /// List title.
    pub title: String,
}

/// Body for `PUT /api/lists/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameListRequest {
    /// New title.
    pub title: String,
}

/// Body for `PUT /api/lists/reorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderListsRequest {
    /// Placements to apply, one per list touched.
    pub lists: Vec<ListPlacement>,
    /// The board the reorder targets. Optional; when absent the server
    /// resolves it from the first placement's list.
    #[serde(default)]
    pub board: Option<BoardId>,
}

/// Response wrapping a single list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// The list.
    pub list: List,
}

// ---- tasks ----

/// Body for `POST /api/lists/{id}/tasks`; the task appends at the end
/// of the list named in the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional priority; defaults to medium.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Optional due date (millis since epoch).
    #[serde(default)]
    pub due_date: Option<u64>,
    /// Optional labels.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Optional initial assignees; each must be a board member.
    #[serde(default)]
    pub assignees: Vec<UserId>,
}

/// Body for `PUT /api/tasks/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// New due date; `Some(None)` clears it.
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<u64>>,
    /// Replacement label set.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

/// Body for `POST /api/tasks/{id}/assign`: toggles the user's assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    /// The user to assign or unassign.
    pub user: UserId,
}

/// Body for `PUT /api/tasks/reorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderTasksRequest {
    /// Placements to apply, one per task touched.
    pub tasks: Vec<TaskPlacement>,
    /// The board the reorder targets. Optional; when absent the server
    /// resolves it from the first placement's list.
    #[serde(default)]
    pub board: Option<BoardId>,
}

/// Response wrapping a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// The task.
    pub task: Task,
}

/// One page of task search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSearchPage {
    /// Matching tasks.
    pub tasks: Vec<Task>,
    /// Paging info.
    pub pagination: Pagination,
}

// ---- activity ----

/// One page of a board's activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPage {
    /// Entries on this page, newest first.
    pub activities: Vec<Activity>,
    /// Paging info.
    pub pagination: Pagination,
}

// ---- shared ----

/// Paging metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Total matching items.
    pub total: u64,
    /// Total pages (at least 1).
    pub pages: u64,
}

impl Pagination {
    /// Builds paging metadata from a page request and the total item count.
    #[must_use]
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let pages = if limit == 0 { 1 } else { total.div_ceil(limit).max(1) };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Query string for paginated endpoints: `?page=..&limit=..`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1-based page number; defaults to 1.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size; defaults to 20.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

/// Query string for `GET /api/tasks/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Substring to match against task titles and descriptions.
    pub q: String,
    /// Paging.
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Generic message envelope, used for deletes and error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

/// Serde helper distinguishing an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::deserialize(deserializer).map(Some)
    }
}
