//! `/api/tasks` handlers, including the reorder reconciler endpoint.
//!
//! A reorder batch is applied last-write-wins per task row with no
//! transaction and no version check: concurrent batches interleave at
//! row granularity and the later write per row sticks. Whatever was
//! applied, the whole submitted batch fans out as one `TasksReordered`
//! event and leaves exactly one activity entry carrying the row count.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use tackboard_proto::event::BoardEvent;
use tackboard_proto::id::{ListId, TaskId};
use tackboard_proto::model::{
    ActionKind, ActivityDetails, MAX_DESCRIPTION_LENGTH, MAX_TASK_TITLE_LENGTH, Task,
};
use tackboard_proto::position::append_position;
use tackboard_proto::rest::{
    AssignRequest, CreateTaskRequest, MessageResponse, Pagination, ReorderTasksRequest,
    SearchQuery, TaskResponse, TaskSearchPage, UpdateTaskRequest,
};

use crate::auth::bearer_user;
use crate::boards::member_board;
use crate::error::ApiError;
use crate::server::AppState;
use crate::store::{new_activity, now_millis};

fn validate_title(title: &str) -> Result<&str, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TASK_TITLE_LENGTH {
        return Err(ApiError::Validation(format!(
            "Title cannot be longer than {MAX_TASK_TITLE_LENGTH} characters"
        )));
    }
    Ok(title)
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ApiError::Validation(format!(
            "Description cannot be longer than {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Fetches a task and gates on membership of its board.
async fn member_task(state: &AppState, user: &crate::store::UserRecord, id: TaskId) -> Result<Task, ApiError> {
    let task = state
        .store
        .get_task(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    member_board(state, user.id, task.board).await?;
    Ok(task)
}

/// `POST /api/lists/{id}/tasks` creates a task at the end of a list.
///
/// # Errors
///
/// `NotFound` for an unknown list, the board gate, and `Validation` on
/// bad fields or non-member assignees.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(list_id): Path<ListId>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let list = state
        .store
        .get_list(list_id)
        .await
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;
    let board = member_board(&state, user.id, list.board).await?;

    let title = validate_title(&req.title)?;
    let description = req.description.unwrap_or_default();
    validate_description(&description)?;
    for assignee in &req.assignees {
        if !board.is_member(assignee) {
            return Err(ApiError::Validation(
                "Assignees must be board members".to_string(),
            ));
        }
    }

    let position = append_position(state.store.task_positions(list.id).await);
    let now = now_millis();
    let task = Task {
        id: TaskId::new(),
        title: title.to_string(),
        description,
        list: list.id,
        board: board.id,
        position,
        assignees: req.assignees,
        priority: req.priority.unwrap_or_default(),
        due_date: req.due_date,
        labels: req.labels,
        created_at: now,
        updated_at: now,
    };
    state.store.put_task(task.clone()).await;

    state
        .store
        .push_activity(new_activity(
            board.id,
            user.id,
            ActionKind::TaskCreated,
            ActivityDetails {
                title: Some(task.title.clone()),
                task: Some(task.id),
                list: Some(list.id),
                list_title: Some(list.title.clone()),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::TaskCreated(task.clone()))
        .await;

    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

/// `GET /api/tasks/{id}`
///
/// # Errors
///
/// `NotFound` or the board gate.
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
) -> Result<Json<TaskResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let task = member_task(&state, &user, id).await?;
    Ok(Json(TaskResponse { task }))
}

/// `PUT /api/tasks/{id}` updates task fields. Absent fields are
/// unchanged; an explicit `null` due date clears it.
///
/// # Errors
///
/// `NotFound`, the board gate, or `Validation`.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let mut task = member_task(&state, &user, id).await?;

    if let Some(title) = &req.title {
        task.title = validate_title(title)?.to_string();
    }
    if let Some(description) = req.description {
        validate_description(&description)?;
        task.description = description;
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if let Some(due_date) = req.due_date {
        task.due_date = due_date;
    }
    if let Some(labels) = req.labels {
        task.labels = labels;
    }
    task.updated_at = now_millis();
    state.store.put_task(task.clone()).await;

    state
        .store
        .push_activity(new_activity(
            task.board,
            user.id,
            ActionKind::TaskUpdated,
            ActivityDetails {
                title: Some(task.title.clone()),
                task: Some(task.id),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::TaskUpdated(task.clone()))
        .await;

    Ok(Json(TaskResponse { task }))
}

/// `DELETE /api/tasks/{id}`
///
/// # Errors
///
/// `NotFound` or the board gate.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let task = member_task(&state, &user, id).await?;

    state.store.delete_task(task.id).await;

    state
        .store
        .push_activity(new_activity(
            task.board,
            user.id,
            ActionKind::TaskDeleted,
            ActivityDetails {
                title: Some(task.title.clone()),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::TaskDeleted {
            task: task.id,
            list: task.list,
            board: task.board,
        })
        .await;

    Ok(Json(MessageResponse {
        message: "Task deleted".to_string(),
    }))
}

/// `POST /api/tasks/{id}/assign` toggles a user's assignment on a task.
///
/// # Errors
///
/// `NotFound` for an unknown task or user, the board gate, and
/// `Validation` when the target is not a board member.
pub async fn assign_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let mut task = member_task(&state, &user, id).await?;
    let board = member_board(&state, user.id, task.board).await?;

    let target = state
        .store
        .get_user(req.user)
        .await
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    if !board.is_member(&target.id) {
        return Err(ApiError::Validation(
            "User must be a board member".to_string(),
        ));
    }

    let was_assigned = task.assignees.contains(&target.id);
    if was_assigned {
        task.assignees.retain(|a| *a != target.id);
    } else {
        task.assignees.push(target.id);
    }
    task.updated_at = now_millis();
    state.store.put_task(task.clone()).await;

    let action = if was_assigned {
        ActionKind::TaskUnassigned
    } else {
        ActionKind::TaskAssigned
    };
    state
        .store
        .push_activity(new_activity(
            task.board,
            user.id,
            action,
            ActivityDetails {
                title: Some(task.title.clone()),
                task: Some(task.id),
                member_name: Some(target.name.clone()),
                target_user: Some(target.id),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::TaskUpdated(task.clone()))
        .await;

    Ok(Json(TaskResponse { task }))
}

/// `PUT /api/tasks/reorder` applies a task placement batch.
///
/// Rows naming unknown tasks are skipped so a batch racing a delete
/// still applies its surviving rows; rows whose task or destination
/// list belongs to another board are skipped too, so the gate on the
/// resolved board covers every write. One activity entry records the
/// applied row count; the full submitted batch fans out as one event.
/// An empty batch succeeds trivially.
///
/// # Errors
///
/// `NotFound` when the board cannot be resolved, plus the board gate.
pub async fn reorder_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ReorderTasksRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    // An empty batch is a trivial success with no side effects.
    if req.tasks.is_empty() {
        return Ok(Json(MessageResponse {
            message: "Tasks reordered".to_string(),
        }));
    }

    // Resolve the board from the request, falling back to the first
    // placement's destination list.
    let board_id = match req.board {
        Some(id) => id,
        None => {
            let first = req.tasks[0].list;
            state
                .store
                .get_list(first)
                .await
                .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?
                .board
        }
    };
    let board = member_board(&state, user.id, board_id).await?;

    let applied = state.store.apply_task_placements(board.id, &req.tasks).await;
    tracing::debug!(
        board = %board.id,
        submitted = req.tasks.len(),
        applied = applied,
        "task reorder applied"
    );

    state
        .store
        .push_activity(new_activity(
            board.id,
            user.id,
            ActionKind::TaskMoved,
            ActivityDetails {
                task_count: Some(u32::try_from(applied).unwrap_or(u32::MAX)),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::TasksReordered {
            board: board.id,
            placements: req.tasks,
        })
        .await;

    Ok(Json(MessageResponse {
        message: "Tasks reordered".to_string(),
    }))
}

/// `GET /api/tasks/search?q=..` searches tasks across every board the
/// caller is a member of.
///
/// # Errors
///
/// `Validation` on an empty query.
pub async fn search_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<TaskSearchPage>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::Validation("Search query is required".to_string()));
    }

    let boards = state.store.member_board_ids(user.id).await;
    let (tasks, total) = state
        .store
        .search_tasks(&boards, q, query.page.page, query.page.limit)
        .await;

    Ok(Json(TaskSearchPage {
        tasks,
        pagination: Pagination::new(query.page.page, query.page.limit, total),
    }))
}
