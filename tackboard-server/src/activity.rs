//! `/api/boards/{id}/activity` handler.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use tackboard_proto::id::BoardId;
use tackboard_proto::rest::{ActivityPage, PageQuery, Pagination};

use crate::auth::bearer_user;
use crate::boards::member_board;
use crate::error::ApiError;
use crate::server::AppState;

/// `GET /api/boards/{id}/activity` pages through a board's activity
/// feed, newest first.
///
/// # Errors
///
/// `NotFound` or `AccessDenied` per the board gate.
pub async fn board_activity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<BoardId>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ActivityPage>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    let board = member_board(&state, user.id, id).await?;

    let (activities, total) = state
        .store
        .activities_for_board(board.id, page.page, page.limit)
        .await;

    Ok(Json(ActivityPage {
        activities,
        pagination: Pagination::new(page.page, page.limit, total),
    }))
}
