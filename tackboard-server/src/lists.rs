//! `/api/lists` handlers.
//!
//! List reorders go through the same last-write-wins reconciler as task
//! reorders but, unlike task reorders, leave no activity entry. They
//! still fan out a single `ListsReordered` event.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use tackboard_proto::event::BoardEvent;
use tackboard_proto::id::{BoardId, ListId};
use tackboard_proto::model::{ActionKind, ActivityDetails, List, MAX_LIST_TITLE_LENGTH};
use tackboard_proto::position::append_position;
use tackboard_proto::rest::{
    CreateListRequest, ListResponse, MessageResponse, RenameListRequest, ReorderListsRequest,
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
    if title.chars().count() > MAX_LIST_TITLE_LENGTH {
        return Err(ApiError::Validation(format!(
            "Title cannot be longer than {MAX_LIST_TITLE_LENGTH} characters"
        )));
    }
    Ok(title)
}

/// `POST /api/boards/{id}/lists` creates a list at the end of the board.
///
/// # Errors
///
/// `NotFound` or `AccessDenied` per the board gate, `Validation` on a
/// bad title.
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(board_id): Path<BoardId>,
    Json(req): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<ListResponse>), ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let board = member_board(&state, user.id, board_id).await?;
    let title = validate_title(&req.title)?;

    let position = append_position(state.store.list_positions(board.id).await);
    let now = now_millis();
    let list = List {
        id: ListId::new(),
        title: title.to_string(),
        board: board.id,
        position,
        created_at: now,
        updated_at: now,
    };
    state.store.put_list(list.clone()).await;

    state
        .store
        .push_activity(new_activity(
            board.id,
            user.id,
            ActionKind::ListCreated,
            ActivityDetails {
                title: Some(list.title.clone()),
                list: Some(list.id),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::ListCreated(list.clone()))
        .await;

    Ok((StatusCode::CREATED, Json(ListResponse { list })))
}

/// `PUT /api/lists/{id}` renames a list.
///
/// # Errors
///
/// `NotFound` for an unknown list, plus the board gate and title
/// validation.
pub async fn rename_list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<ListId>,
    Json(req): Json<RenameListRequest>,
) -> Result<Json<ListResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let mut list = state
        .store
        .get_list(id)
        .await
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;
    member_board(&state, user.id, list.board).await?;

    list.title = validate_title(&req.title)?.to_string();
    list.updated_at = now_millis();
    state.store.put_list(list.clone()).await;

    state
        .store
        .push_activity(new_activity(
            list.board,
            user.id,
            ActionKind::ListUpdated,
            ActivityDetails {
                title: Some(list.title.clone()),
                list: Some(list.id),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::ListUpdated(list.clone()))
        .await;

    Ok(Json(ListResponse { list }))
}

/// `DELETE /api/lists/{id}` deletes a list and every task in it.
///
/// # Errors
///
/// `NotFound` for an unknown list, plus the board gate.
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<ListId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let list = state
        .store
        .get_list(id)
        .await
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;
    member_board(&state, user.id, list.board).await?;

    state.store.delete_list(list.id).await;

    state
        .store
        .push_activity(new_activity(
            list.board,
            user.id,
            ActionKind::ListDeleted,
            ActivityDetails {
                title: Some(list.title.clone()),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::ListDeleted {
            list: list.id,
            board: list.board,
        })
        .await;

    Ok(Json(MessageResponse {
        message: "List deleted".to_string(),
    }))
}

/// `PUT /api/lists/reorder` applies a list placement batch.
///
/// Each placement is written independently, last write wins; unknown
/// list ids and lists on a different board are skipped. No activity
/// entry is recorded for list reorders. An empty batch succeeds
/// trivially.
///
/// # Errors
///
/// `NotFound` when the board cannot be resolved, plus the board gate.
pub async fn reorder_lists(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ReorderListsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    // An empty batch is a trivial success with no side effects.
    if req.lists.is_empty() {
        return Ok(Json(MessageResponse {
            message: "Lists reordered".to_string(),
        }));
    }

    // Resolve the board from the request, falling back to the first
    // placement's list.
    let board_id = match req.board {
        Some(id) => id,
        None => {
            let first = req.lists[0].list;
            state
                .store
                .get_list(first)
                .await
                .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?
                .board
        }
    };
    let board = member_board(&state, user.id, board_id).await?;

    let applied = state.store.apply_list_placements(board.id, &req.lists).await;
    tracing::debug!(
        board = %board.id,
        submitted = req.lists.len(),
        applied = applied,
        "list reorder applied"
    );

    state
        .topics
        .broadcast(&BoardEvent::ListsReordered {
            board: board.id,
            placements: req.lists,
        })
        .await;

    Ok(Json(MessageResponse {
        message: "Lists reordered".to_string(),
    }))
}
