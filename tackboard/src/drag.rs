//! Drag-and-drop reordering session.
//!
//! A session runs idle, dragging, idle. While dragging, hover targets
//! speculatively relocate the task inside the local [`BoardState`] so
//! the UI previews the move. Dropping computes a full renumbered
//! placement set (positions `0..n` for every affected list), applies it
//! optimistically, and hands back a [`ReorderBatch`] to submit to the
//! server. Cancelling only ends the session; speculative hover
//! relocations are not rolled back, the next fetch or event resolves
//! any drift.
//!
//! If the server rejects the committed batch there is no rollback
//! either: the replica keeps the optimistic placement until fresh
//! server state arrives.

use tackboard_proto::id::{BoardId, ListId, TaskId};
use tackboard_proto::model::TaskPlacement;
use tackboard_proto::rest::ReorderTasksRequest;

use crate::state::BoardState;

/// Errors from drag session operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DragError {
    /// `begin` was called while a drag was already in progress.
    #[error("a drag is already in progress")]
    AlreadyDragging,
    /// A hover or drop was attempted with no drag in progress.
    #[error("no drag in progress")]
    NotDragging,
    /// The replica does not hold the named task.
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
    /// The replica does not hold the named list.
    #[error("unknown list {0}")]
    UnknownList(ListId),
    /// The replica has no board loaded.
    #[error("no board loaded")]
    BoardUnloaded,
}

/// What the pointer is over when hovering or dropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Over another task: the dragged task takes its place.
    Task(TaskId),
    /// Over a list body: the dragged task appends to that list.
    List(ListId),
}

/// The committed outcome of a drop, ready to send to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderBatch {
    /// The board the reorder belongs to.
    pub board: BoardId,
    /// Renumbered placements for every task in the affected lists.
    pub placements: Vec<TaskPlacement>,
}

impl ReorderBatch {
    /// Converts the batch into the reorder request body.
    #[must_use]
    pub fn into_request(self) -> ReorderTasksRequest {
        ReorderTasksRequest {
            tasks: self.placements,
            board: Some(self.board),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Dragging { task: TaskId, origin_list: ListId },
}

/// Tracks one drag-and-drop interaction over a [`BoardState`].
#[derive(Debug, Default)]
pub struct DragSession {
    phase: Phase,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

impl DragSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Starts dragging a task.
    ///
    /// # Errors
    ///
    /// [`DragError::AlreadyDragging`] if a drag is in progress, or
    /// [`DragError::UnknownTask`] if the replica does not hold the task.
    pub fn begin(&mut self, state: &BoardState, task: TaskId) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::AlreadyDragging);
        }
        let origin_list = state
            .task(task)
            .ok_or(DragError::UnknownTask(task))?
            .list;
        self.phase = Phase::Dragging { task, origin_list };
        Ok(())
    }

    /// Speculatively relocates the dragged task under the hover target.
    ///
    /// Hovering over a task takes its place (moving into its list when
    /// it lives elsewhere); hovering over a list appends to that list.
    /// The relocation mutates only the local replica.
    ///
    /// # Errors
    ///
    /// [`DragError::NotDragging`], or an unknown-target error.
    pub fn hover(&mut self, state: &mut BoardState, target: DropTarget) -> Result<(), DragError> {
        let Phase::Dragging { task, .. } = self.phase else {
            return Err(DragError::NotDragging);
        };
        let Some((dest, index)) = resolve_target(state, task, target)? else {
            return Ok(());
        };
        relocate(state, task, dest, index)?;
        Ok(())
    }

    /// Drops the dragged task on a target and commits the move locally.
    ///
    /// Every task in the origin list, the hover-current list, and the
    /// drop list gets a fresh position `0..n`; the whole set is applied
    /// to the replica and returned for submission. The session returns
    /// to idle.
    ///
    /// # Errors
    ///
    /// [`DragError::NotDragging`], [`DragError::BoardUnloaded`], or an
    /// unknown-target error. The session stays in the dragging phase on
    /// error so the caller can retry or cancel.
    pub fn drop_on(
        &mut self,
        state: &mut BoardState,
        target: DropTarget,
    ) -> Result<ReorderBatch, DragError> {
        let Phase::Dragging { task, origin_list } = self.phase else {
            return Err(DragError::NotDragging);
        };
        let board = state.board().ok_or(DragError::BoardUnloaded)?.id;

        let hover_list = state
            .task(task)
            .ok_or(DragError::UnknownTask(task))?
            .list;

        let mut placements = match resolve_target(state, task, target)? {
            Some((dest, index)) => relocate(state, task, dest, index)?,
            // Dropping on the dragged task itself: renumber in place.
            None => {
                let current = renumber(state, hover_list);
                state.apply_task_placements(&current);
                current
            }
        };

        // A cross-list hover may have left the origin list unrenumbered.
        let covered: Vec<ListId> = placements.iter().map(|p| p.list).collect();
        for leftover in [origin_list, hover_list] {
            if !covered.contains(&leftover) {
                let extra = renumber(state, leftover);
                state.apply_task_placements(&extra);
                placements.extend(extra);
            }
        }

        self.phase = Phase::Idle;
        Ok(ReorderBatch { board, placements })
    }

    /// Ends the drag without committing.
    ///
    /// Speculative hover relocations are left in place; they are
    /// corrected by the next event or fetch.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}

/// Resolves a target to a destination list and insertion index.
///
/// Returns `None` when the target is the dragged task itself.
fn resolve_target(
    state: &BoardState,
    dragged: TaskId,
    target: DropTarget,
) -> Result<Option<(ListId, usize)>, DragError> {
    match target {
        DropTarget::Task(over) => {
            if over == dragged {
                return Ok(None);
            }
            let dest = state.task(over).ok_or(DragError::UnknownTask(over))?.list;
            let index = state
                .tasks_for_list(dest)
                .iter()
                .filter(|t| t.id != dragged)
                .position(|t| t.id == over)
                .unwrap_or(0);
            Ok(Some((dest, index)))
        }
        DropTarget::List(list) => {
            if state.list(list).is_none() {
                return Err(DragError::UnknownList(list));
            }
            Ok(Some((list, usize::MAX)))
        }
    }
}

/// Moves a task to `index` within `dest` and renumbers the affected
/// lists to positions `0..n`, applying the placements to the replica.
fn relocate(
    state: &mut BoardState,
    task: TaskId,
    dest: ListId,
    index: usize,
) -> Result<Vec<TaskPlacement>, DragError> {
    let current_list = state.task(task).ok_or(DragError::UnknownTask(task))?.list;

    let mut dest_ids: Vec<TaskId> = state
        .tasks_for_list(dest)
        .iter()
        .map(|t| t.id)
        .filter(|id| *id != task)
        .collect();
    let index = index.min(dest_ids.len());
    dest_ids.insert(index, task);

    let mut placements = renumber_ids(&dest_ids, dest);
    if current_list != dest {
        let src_ids: Vec<TaskId> = state
            .tasks_for_list(current_list)
            .iter()
            .map(|t| t.id)
            .filter(|id| *id != task)
            .collect();
        placements.extend(renumber_ids(&src_ids, current_list));
    }

    state.apply_task_placements(&placements);
    Ok(placements)
}

/// Fresh `0..n` placements for a list's current ordering.
fn renumber(state: &BoardState, list: ListId) -> Vec<TaskPlacement> {
    let ids: Vec<TaskId> = state.tasks_for_list(list).iter().map(|t| t.id).collect();
    renumber_ids(&ids, list)
}

fn renumber_ids(ids: &[TaskId], list: ListId) -> Vec<TaskPlacement> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| TaskPlacement {
            task: *id,
            list,
            position: i64::try_from(i).unwrap_or(i64::MAX),
        })
        .collect()
}
