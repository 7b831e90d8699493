//! API error taxonomy and its HTTP mapping.
//!
//! Handlers check existence before authorization, so a non-member
//! probing a board id gets `NotFound` when the id is bogus and
//! `AccessDenied` only when the resource actually exists.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tackboard_proto::rest::MessageResponse;

/// Errors a request handler can produce, each mapping to one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid credentials (401).
    #[error("{0}")]
    Unauthenticated(String),
    /// Authenticated but not allowed to act on this resource (403).
    #[error("{0}")]
    AccessDenied(String),
    /// The resource does not exist (404).
    #[error("{0}")]
    NotFound(String),
    /// The request body failed validation (400).
    #[error("{0}")]
    Validation(String),
    /// The request conflicts with existing state (409).
    #[error("{0}")]
    Conflict(String),
    /// Unexpected server-side failure (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal error");
        }
        let body = MessageResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
