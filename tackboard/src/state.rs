//! Local replica of one board.
//!
//! `BoardState` holds the board, its member profiles, lists, and tasks
//! as last fetched over HTTP, and patches itself from realtime events.
//! There is no echo suppression: the feed replays the client's own
//! mutations and applying them again is harmless because every patch is
//! an upsert or an idempotent placement write.

use tackboard_proto::event::BoardEvent;
use tackboard_proto::id::{BoardId, ListId, TaskId};
use tackboard_proto::model::{Board, List, ListPlacement, Task, TaskPlacement, UserProfile};
use tackboard_proto::rest::BoardDetail;

/// In-memory replica of a single board and its contents.
#[derive(Debug, Default)]
pub struct BoardState {
    board: Option<Board>,
    members: Vec<UserProfile>,
    lists: Vec<List>,
    tasks: Vec<Task>,
}

impl BoardState {
    /// Creates an empty replica with no board loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the replica with a freshly fetched board detail.
    pub fn load(&mut self, detail: BoardDetail) {
        self.board = Some(detail.board);
        self.members = detail.members;
        self.lists = detail.lists;
        self.tasks = detail.tasks;
    }

    /// The loaded board, if any.
    #[must_use]
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Member profiles of the loaded board.
    #[must_use]
    pub fn members(&self) -> &[UserProfile] {
        &self.members
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Looks up a list by id.
    #[must_use]
    pub fn list(&self, id: ListId) -> Option<&List> {
        self.lists.iter().find(|l| l.id == id)
    }

    /// The board's lists in canonical order.
    ///
    /// Equal positions are broken by creation time then id, matching
    /// the server's ordering so both sides render identically.
    #[must_use]
    pub fn lists_in_order(&self) -> Vec<&List> {
        let mut lists: Vec<&List> = self.lists.iter().collect();
        lists.sort_by_key(|l| (l.position, l.created_at, *l.id.as_uuid()));
        lists
    }

    /// The tasks of one list in canonical order.
    #[must_use]
    pub fn tasks_for_list(&self, list: ListId) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| t.list == list).collect();
        tasks.sort_by_key(|t| (t.position, t.created_at, *t.id.as_uuid()));
        tasks
    }

    /// Applies a task placement batch to the replica.
    ///
    /// Placements naming tasks the replica does not hold are skipped,
    /// mirroring the server reconciler.
    pub fn apply_task_placements(&mut self, placements: &[TaskPlacement]) {
        for placement in placements {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == placement.task) {
                task.list = placement.list;
                task.position = placement.position;
            }
        }
    }

    /// Applies a list placement batch to the replica.
    pub fn apply_list_placements(&mut self, placements: &[ListPlacement]) {
        for placement in placements {
            if let Some(list) = self.lists.iter_mut().find(|l| l.id == placement.list) {
                list.position = placement.position;
            }
        }
    }

    /// Patches the replica from one realtime event.
    ///
    /// Events scoped to a different board are ignored. `BoardDeleted`
    /// clears the replica entirely.
    pub fn apply_event(&mut self, event: &BoardEvent) {
        let Some(current) = self.board.as_ref().map(|b| b.id) else {
            return;
        };
        if event.board_id() != current {
            return;
        }

        match event {
            BoardEvent::TaskCreated(task) | BoardEvent::TaskUpdated(task) => {
                self.upsert_task(task.clone());
            }
            BoardEvent::TaskDeleted { task, .. } => {
                self.tasks.retain(|t| t.id != *task);
            }
            BoardEvent::TasksReordered { placements, .. } => {
                self.apply_task_placements(placements);
            }
            BoardEvent::ListCreated(list) | BoardEvent::ListUpdated(list) => {
                self.upsert_list(list.clone());
            }
            BoardEvent::ListDeleted { list, .. } => {
                self.lists.retain(|l| l.id != *list);
                self.tasks.retain(|t| t.list != *list);
            }
            BoardEvent::ListsReordered { placements, .. } => {
                self.apply_list_placements(placements);
            }
            BoardEvent::BoardUpdated(board) => {
                self.board = Some(board.clone());
            }
            BoardEvent::BoardDeleted { .. } => {
                self.clear();
            }
            BoardEvent::MemberAdded { board, member } => {
                self.board = Some(board.clone());
                if let Some(existing) = self.members.iter_mut().find(|m| m.id == member.id) {
                    *existing = member.clone();
                } else {
                    self.members.push(member.clone());
                }
            }
        }
    }

    /// Drops everything, returning the replica to its unloaded state.
    pub fn clear(&mut self) {
        self.board = None;
        self.members.clear();
        self.lists.clear();
        self.tasks.clear();
    }

    fn upsert_task(&mut self, task: Task) {
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        } else {
            self.tasks.push(task);
        }
    }

    fn upsert_list(&mut self, list: List) {
        if let Some(existing) = self.lists.iter_mut().find(|l| l.id == list.id) {
            *existing = list;
        } else {
            self.lists.push(list);
        }
    }
}
