//! In-memory persistence for accounts, boards, lists, tasks, and the
//! activity log.
//!
//! All collections live behind [`RwLock`]-guarded maps and are lost on
//! restart. Reads hand out clones; writers mutate under the lock.
//! Reorder batches are applied last-write-wins per task row with no
//! transactional envelope, so two concurrent batches interleave at row
//! granularity and the later write for any given row sticks.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tackboard_proto::id::{ActivityId, BoardId, ListId, TaskId, UserId};
use tackboard_proto::model::{
    Activity, Board, List, ListPlacement, Task, TaskPlacement, UserProfile,
};
use tokio::sync::RwLock;

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// A stored user account, including the credential hash.
///
/// Never serialized to the wire; handlers project it through
/// [`UserRecord::profile`] before responding.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Account id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique case-insensitively.
    pub email: String,
    /// Optional avatar URL.
    pub avatar: Option<String>,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Creation time (millis since epoch).
    pub created_at: u64,
}

impl UserRecord {
    /// Public projection of this account.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An account with the same email already exists.
    #[error("User already exists")]
    EmailTaken,
}

/// The in-memory database.
pub struct Store {
    users: RwLock<HashMap<UserId, UserRecord>>,
    boards: RwLock<HashMap<BoardId, Board>>,
    lists: RwLock<HashMap<ListId, List>>,
    tasks: RwLock<HashMap<TaskId, Task>>,
    activities: RwLock<Vec<Activity>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            boards: RwLock::new(HashMap::new()),
            lists: RwLock::new(HashMap::new()),
            tasks: RwLock::new(HashMap::new()),
            activities: RwLock::new(Vec::new()),
        }
    }

    // ---- users ----

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmailTaken`] if an account with the same
    /// email (case-insensitive) already exists.
    pub async fn create_user(&self, record: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let email_lower = record.email.to_lowercase();
        if users.values().any(|u| u.email.to_lowercase() == email_lower) {
            return Err(StoreError::EmailTaken);
        }
        users.insert(record.id, record);
        Ok(())
    }

    /// Looks up an account by id.
    pub async fn get_user(&self, id: UserId) -> Option<UserRecord> {
        self.users.read().await.get(&id).cloned()
    }

    /// Looks up an account by email, case-insensitively.
    pub async fn find_user_by_email(&self, email: &str) -> Option<UserRecord> {
        let email_lower = email.to_lowercase();
        let users = self.users.read().await;
        users
            .values()
            .find(|u| u.email.to_lowercase() == email_lower)
            .cloned()
    }

    /// Resolves a set of user ids to profiles, skipping unknown ids.
    pub async fn profiles(&self, ids: &[UserId]) -> Vec<UserProfile> {
        let users = self.users.read().await;
        ids.iter()
            .filter_map(|id| users.get(id).map(UserRecord::profile))
            .collect()
    }

    /// Searches accounts by name or email substring, excluding the
    /// caller. Case-insensitive, sorted by name.
    pub async fn search_users(&self, query: &str, exclude: UserId) -> Vec<UserProfile> {
        let needle = query.to_lowercase();
        let users = self.users.read().await;
        let mut found: Vec<UserProfile> = users
            .values()
            .filter(|u| u.id != exclude)
            .filter(|u| {
                u.name.to_lowercase().contains(&needle)
                    || u.email.to_lowercase().contains(&needle)
            })
            .map(UserRecord::profile)
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    // ---- boards ----

    /// Inserts or replaces a board.
    pub async fn put_board(&self, board: Board) {
        self.boards.write().await.insert(board.id, board);
    }

    /// Looks up a board by id.
    pub async fn get_board(&self, id: BoardId) -> Option<Board> {
        self.boards.read().await.get(&id).cloned()
    }

    /// One page of boards the user is a member of, most recently
    /// updated first. Returns the page and the total match count.
    pub async fn boards_for_user(&self, user: UserId, page: u64, limit: u64) -> (Vec<Board>, u64) {
        let boards = self.boards.read().await;
        let mut mine: Vec<Board> = boards
            .values()
            .filter(|b| b.is_member(&user))
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let total = mine.len() as u64;
        (page_slice(mine, page, limit), total)
    }

    /// Ids of every board the user is a member of, in no particular order.
    pub async fn member_board_ids(&self, user: UserId) -> Vec<BoardId> {
        let boards = self.boards.read().await;
        boards
            .values()
            .filter(|b| b.is_member(&user))
            .map(|b| b.id)
            .collect()
    }

    /// Deletes a board and cascades away its lists, tasks, and activity.
    ///
    /// Returns `true` if the board existed.
    pub async fn delete_board(&self, id: BoardId) -> bool {
        let existed = self.boards.write().await.remove(&id).is_some();
        if existed {
            self.lists.write().await.retain(|_, l| l.board != id);
            self.tasks.write().await.retain(|_, t| t.board != id);
            self.activities.write().await.retain(|a| a.board != id);
        }
        existed
    }

    // ---- lists ----

    /// Inserts or replaces a list.
    pub async fn put_list(&self, list: List) {
        self.lists.write().await.insert(list.id, list);
    }

    /// Looks up a list by id.
    pub async fn get_list(&self, id: ListId) -> Option<List> {
        self.lists.read().await.get(&id).cloned()
    }

    /// All lists on a board in canonical order.
    ///
    /// Equal positions (possible transiently mid-reorder) are broken by
    /// creation time, then id, so the order is deterministic.
    pub async fn lists_for_board(&self, board: BoardId) -> Vec<List> {
        let lists = self.lists.read().await;
        let mut found: Vec<List> = lists.values().filter(|l| l.board == board).cloned().collect();
        found.sort_by_key(|l| (l.position, l.created_at, *l.id.as_uuid()));
        found
    }

    /// Existing list positions on a board, for computing an append rank.
    pub async fn list_positions(&self, board: BoardId) -> Vec<i64> {
        let lists = self.lists.read().await;
        lists
            .values()
            .filter(|l| l.board == board)
            .map(|l| l.position)
            .collect()
    }

    /// Deletes a list and cascades away its tasks.
    ///
    /// Returns `true` if the list existed.
    pub async fn delete_list(&self, id: ListId) -> bool {
        let existed = self.lists.write().await.remove(&id).is_some();
        if existed {
            self.tasks.write().await.retain(|_, t| t.list != id);
        }
        existed
    }

    /// Applies a list reorder batch scoped to one board, last write wins
    /// per row.
    ///
    /// Placements naming unknown lists or lists on a different board are
    /// skipped. Returns the number of rows actually written.
    pub async fn apply_list_placements(
        &self,
        board: BoardId,
        placements: &[ListPlacement],
    ) -> usize {
        let now = now_millis();
        let mut lists = self.lists.write().await;
        let mut applied = 0;
        for placement in placements {
            if let Some(list) = lists.get_mut(&placement.list) {
                if list.board != board {
                    continue;
                }
                list.position = placement.position;
                list.updated_at = now;
                applied += 1;
            }
        }
        applied
    }

    // ---- tasks ----

    /// Inserts or replaces a task.
    pub async fn put_task(&self, task: Task) {
        self.tasks.write().await.insert(task.id, task);
    }

    /// Looks up a task by id.
    pub async fn get_task(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().await.get(&id).cloned()
    }

    /// Every task on a board, ordered by (list, position) with the same
    /// deterministic tie-break as [`Store::lists_for_board`].
    pub async fn tasks_for_board(&self, board: BoardId) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        let mut found: Vec<Task> = tasks.values().filter(|t| t.board == board).cloned().collect();
        found.sort_by_key(|t| (*t.list.as_uuid(), t.position, t.created_at, *t.id.as_uuid()));
        found
    }

    /// Existing task positions within a list, for computing an append rank.
    pub async fn task_positions(&self, list: ListId) -> Vec<i64> {
        let tasks = self.tasks.read().await;
        tasks
            .values()
            .filter(|t| t.list == list)
            .map(|t| t.position)
            .collect()
    }

    /// Deletes a task. Returns `true` if it existed.
    pub async fn delete_task(&self, id: TaskId) -> bool {
        self.tasks.write().await.remove(&id).is_some()
    }

    /// Applies a task reorder batch scoped to one board, last write wins
    /// per row.
    ///
    /// Each placement rewrites the task's list, position, and
    /// denormalized board from the destination list. A row is skipped
    /// when its task or destination list is unknown (a batch racing a
    /// delete still applies its surviving rows) or when either lives on
    /// a different board, so a batch can never move entities across a
    /// board boundary. Returns the number of rows written.
    pub async fn apply_task_placements(
        &self,
        board: BoardId,
        placements: &[TaskPlacement],
    ) -> usize {
        let now = now_millis();
        let lists = self.lists.read().await;
        let mut tasks = self.tasks.write().await;
        let mut applied = 0;
        for placement in placements {
            let Some(dest) = lists.get(&placement.list) else {
                continue;
            };
            if dest.board != board {
                continue;
            }
            if let Some(task) = tasks.get_mut(&placement.task) {
                if task.board != board {
                    continue;
                }
                task.list = placement.list;
                task.position = placement.position;
                task.board = dest.board;
                task.updated_at = now;
                applied += 1;
            }
        }
        applied
    }

    /// One page of tasks matching a title or description substring
    /// across the given boards, most recently updated first.
    pub async fn search_tasks(
        &self,
        boards: &[BoardId],
        query: &str,
        page: u64,
        limit: u64,
    ) -> (Vec<Task>, u64) {
        let needle = query.to_lowercase();
        let tasks = self.tasks.read().await;
        let mut found: Vec<Task> = tasks
            .values()
            .filter(|t| boards.contains(&t.board))
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let total = found.len() as u64;
        (page_slice(found, page, limit), total)
    }

    // ---- activity ----

    /// Appends an activity entry. Entries are immutable once written.
    pub async fn push_activity(&self, activity: Activity) {
        self.activities.write().await.push(activity);
    }

    /// One page of a board's activity feed, newest first.
    pub async fn activities_for_board(
        &self,
        board: BoardId,
        page: u64,
        limit: u64,
    ) -> (Vec<Activity>, u64) {
        let activities = self.activities.read().await;
        let mut found: Vec<Activity> = activities.iter().filter(|a| a.board == board).cloned().collect();
        found.sort_by(|a, b| (b.created_at, b.id.as_uuid()).cmp(&(a.created_at, a.id.as_uuid())));
        let total = found.len() as u64;
        (page_slice(found, page, limit), total)
    }
}

/// Builds an [`Activity`] entry stamped with the current time.
#[must_use]
pub fn new_activity(
    board: BoardId,
    user: UserId,
    action: tackboard_proto::model::ActionKind,
    details: tackboard_proto::model::ActivityDetails,
) -> Activity {
    Activity {
        id: ActivityId::new(),
        board,
        user,
        action,
        details,
        created_at: now_millis(),
    }
}

/// Extracts the 1-based `page` of size `limit` from a sorted vector.
fn page_slice<T>(items: Vec<T>, page: u64, limit: u64) -> Vec<T> {
    let skip = usize::try_from(page.saturating_sub(1).saturating_mul(limit)).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
}
