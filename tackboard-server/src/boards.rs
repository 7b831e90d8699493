//! `/api/boards` handlers and the board access gate.
//!
//! Access rules: any board member may read the board and mutate its
//! lists and tasks; only the owner may update or delete the board
//! itself or add members. Existence is always checked before
//! authorization, so probing an unknown id yields 404 and probing a
//! real board without membership yields 403.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use tackboard_proto::event::BoardEvent;
use tackboard_proto::id::{BoardId, UserId};
use tackboard_proto::model::{
    ActionKind, ActivityDetails, Board, DEFAULT_BACKGROUND, MAX_BOARD_TITLE_LENGTH,
};
use tackboard_proto::rest::{
    AddMemberRequest, BoardDetail, BoardResponse, BoardsPage, CreateBoardRequest, MessageResponse,
    PageQuery, Pagination, UpdateBoardRequest,
};

use crate::auth::bearer_user;
use crate::error::ApiError;
use crate::server::AppState;
use crate::store::{new_activity, now_millis};

/// Fetches a board the user must be a member of.
///
/// # Errors
///
/// `NotFound` if the board does not exist, `AccessDenied` if the user
/// is not a member.
pub async fn member_board(
    state: &AppState,
    user: UserId,
    id: BoardId,
) -> Result<Board, ApiError> {
    let board = state
        .store
        .get_board(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    if !board.is_member(&user) {
        return Err(ApiError::AccessDenied(
            "Not authorized to access this board".to_string(),
        ));
    }
    Ok(board)
}

/// Fetches a board the user must own.
///
/// Same ordering as [`member_board`]: existence first, then ownership.
///
/// # Errors
///
/// `NotFound` if the board does not exist, `AccessDenied` if the user
/// is not the owner.
pub async fn owner_board(state: &AppState, user: UserId, id: BoardId) -> Result<Board, ApiError> {
    let board = state
        .store
        .get_board(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    if board.owner != user {
        return Err(ApiError::AccessDenied(
            "Only the board owner can do that".to_string(),
        ));
    }
    Ok(board)
}

fn validate_title(title: &str) -> Result<&str, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_BOARD_TITLE_LENGTH {
        return Err(ApiError::Validation(format!(
            "Title cannot be longer than {MAX_BOARD_TITLE_LENGTH} characters"
        )));
    }
    Ok(title)
}

/// `GET /api/boards` lists the caller's boards, most recently updated
/// first.
///
/// # Errors
///
/// `Unauthenticated` without a valid token.
pub async fn list_boards(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> Result<Json<BoardsPage>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let (boards, total) = state
        .store
        .boards_for_user(user.id, page.page, page.limit)
        .await;
    Ok(Json(BoardsPage {
        boards,
        pagination: Pagination::new(page.page, page.limit, total),
    }))
}

/// `POST /api/boards`
///
/// # Errors
///
/// `Validation` on a bad title.
pub async fn create_board(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<BoardResponse>), ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let title = validate_title(&req.title)?;

    let now = now_millis();
    let board = Board {
        id: BoardId::new(),
        title: title.to_string(),
        description: req.description.unwrap_or_default(),
        owner: user.id,
        members: vec![user.id],
        background: req.background.unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
        created_at: now,
        updated_at: now,
    };
    state.store.put_board(board.clone()).await;

    state
        .store
        .push_activity(new_activity(
            board.id,
            user.id,
            ActionKind::BoardCreated,
            ActivityDetails {
                title: Some(board.title.clone()),
                ..ActivityDetails::default()
            },
        ))
        .await;

    tracing::info!(board = %board.id, user = %user.id, "board created");
    Ok((StatusCode::CREATED, Json(BoardResponse { board })))
}

/// `GET /api/boards/{id}` returns the board plus everything needed to
/// render it: member profiles, lists in order, and all tasks.
///
/// # Errors
///
/// `NotFound` or `AccessDenied` per the access gate.
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<BoardId>,
) -> Result<Json<BoardDetail>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let board = member_board(&state, user.id, id).await?;

    let members = state.store.profiles(&board.members).await;
    let lists = state.store.lists_for_board(id).await;
    let tasks = state.store.tasks_for_board(id).await;

    Ok(Json(BoardDetail {
        board,
        members,
        lists,
        tasks,
    }))
}

/// `PUT /api/boards/{id}` is owner-only. Absent fields are unchanged.
///
/// # Errors
///
/// `NotFound`, `AccessDenied`, or `Validation`.
pub async fn update_board(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<BoardId>,
    Json(req): Json<UpdateBoardRequest>,
) -> Result<Json<BoardResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let mut board = owner_board(&state, user.id, id).await?;

    if let Some(title) = &req.title {
        board.title = validate_title(title)?.to_string();
    }
    if let Some(description) = req.description {
        board.description = description;
    }
    if let Some(background) = req.background {
        board.background = background;
    }
    board.updated_at = now_millis();
    state.store.put_board(board.clone()).await;

    state
        .store
        .push_activity(new_activity(
            board.id,
            user.id,
            ActionKind::BoardUpdated,
            ActivityDetails {
                title: Some(board.title.clone()),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::BoardUpdated(board.clone()))
        .await;

    Ok(Json(BoardResponse { board }))
}

/// `DELETE /api/boards/{id}` is owner-only and cascades away the
/// board's lists, tasks, and activity.
///
/// # Errors
///
/// `NotFound` or `AccessDenied`.
pub async fn delete_board(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<BoardId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let board = owner_board(&state, user.id, id).await?;

    state.store.delete_board(board.id).await;
    state
        .topics
        .broadcast(&BoardEvent::BoardDeleted { board: board.id })
        .await;

    tracing::info!(board = %board.id, user = %user.id, "board deleted");
    Ok(Json(MessageResponse {
        message: "Board deleted".to_string(),
    }))
}

/// `POST /api/boards/{id}/members` is owner-only and adds an account by
/// email.
///
/// # Errors
///
/// `NotFound` for an unknown board or email, `AccessDenied` for a
/// non-owner, `Validation` when the user is already a member.
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<BoardId>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<BoardResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let mut board = owner_board(&state, user.id, id).await?;

    let member = state
        .store
        .find_user_by_email(req.email.trim())
        .await
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if board.is_member(&member.id) {
        return Err(ApiError::Validation(
            "User is already a member".to_string(),
        ));
    }

    board.members.push(member.id);
    board.updated_at = now_millis();
    state.store.put_board(board.clone()).await;

    state
        .store
        .push_activity(new_activity(
            board.id,
            user.id,
            ActionKind::MemberAdded,
            ActivityDetails {
                member_name: Some(member.name.clone()),
                member_email: Some(member.email.clone()),
                ..ActivityDetails::default()
            },
        ))
        .await;

    state
        .topics
        .broadcast(&BoardEvent::MemberAdded {
            board: board.clone(),
            member: member.profile(),
        })
        .await;

    Ok(Json(BoardResponse { board }))
}
