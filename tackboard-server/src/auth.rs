//! Accounts, sessions, and the `/api/auth` handlers.
//!
//! Passwords are bcrypt-hashed at signup and verified at login. A
//! successful signup or login issues an opaque session token which the
//! client sends back as `Authorization: Bearer <token>`. Tokens live in
//! memory and die with the process.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use serde::Deserialize;
use tackboard_proto::id::UserId;
use tackboard_proto::rest::{
    AuthResponse, LoginRequest, SignupRequest, UserResponse, UsersResponse,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::AppState;
use crate::store::{StoreError, UserRecord, now_millis};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// In-memory session token table.
pub struct Sessions {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl Default for Sessions {
    fn default() -> Self {
        Self::new()
    }
}

impl Sessions {
    /// Creates an empty session table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a fresh opaque token for a user.
    pub async fn issue(&self, user: UserId) -> String {
        let token = Uuid::now_v7().simple().to_string();
        self.tokens.write().await.insert(token.clone(), user);
        token
    }

    /// Resolves a token back to its user, if the token is live.
    pub async fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.read().await.get(token).copied()
    }
}

/// Resolves the caller from the `Authorization: Bearer` header.
///
/// # Errors
///
/// Returns [`ApiError::Unauthenticated`] when the header is missing,
/// malformed, or names a dead token or deleted account.
pub async fn bearer_user(state: &AppState, headers: &HeaderMap) -> Result<UserRecord, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthenticated("Not authorized, no token".to_string()))?;

    let user_id = state
        .sessions
        .resolve(token)
        .await
        .ok_or_else(|| ApiError::Unauthenticated("Not authorized, token failed".to_string()))?;

    state
        .store
        .get_user(user_id)
        .await
        .ok_or_else(|| ApiError::Unauthenticated("Not authorized, token failed".to_string()))
}

/// `POST /api/auth/signup`
///
/// # Errors
///
/// `Validation` on a bad body, `Conflict` when the email is taken.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = req.name.trim();
    let email = req.email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(ApiError::Validation(
            "Please provide name, email and password".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(ApiError::Validation(
            "Please provide a valid email".to_string(),
        ));
    }
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let password_hash = bcrypt::hash(&req.password, state.bcrypt_cost)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let record = UserRecord {
        id: UserId::new(),
        name: name.to_string(),
        email: email.to_string(),
        avatar: None,
        password_hash,
        created_at: now_millis(),
    };
    let profile = record.profile();

    state.store.create_user(record).await.map_err(|e| match e {
        StoreError::EmailTaken => ApiError::Conflict("User already exists".to_string()),
    })?;

    let token = state.sessions.issue(profile.id).await;
    tracing::info!(user = %profile.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: profile,
        }),
    ))
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// `Unauthenticated` when the email or password does not match; the
/// message does not reveal which one was wrong.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let invalid = || ApiError::Unauthenticated("Invalid email or password".to_string());

    let record = state
        .store
        .find_user_by_email(req.email.trim())
        .await
        .ok_or_else(invalid)?;

    let matches = bcrypt::verify(&req.password, &record.password_hash)
        .map_err(|e| ApiError::Internal(format!("password verification failed: {e}")))?;
    if !matches {
        return Err(invalid());
    }

    let token = state.sessions.issue(record.id).await;
    tracing::debug!(user = %record.id, "login");

    Ok(Json(AuthResponse {
        token,
        user: record.profile(),
    }))
}

/// `GET /api/auth/me`
///
/// # Errors
///
/// `Unauthenticated` without a valid token.
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let user = bearer_user(&state, &headers).await?;
    Ok(Json(UserResponse {
        user: user.profile(),
    }))
}

/// Query string for `GET /api/auth/users`.
#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    /// Substring matched against names and emails.
    #[serde(default)]
    pub q: String,
}

/// `GET /api/auth/users?q=..` searches accounts to add as members.
///
/// The caller is always excluded from the results.
///
/// # Errors
///
/// `Unauthenticated` without a valid token.
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    let caller = bearer_user(&state, &headers).await?;
    let users = state.store.search_users(&query.q, caller.id).await;
    Ok(Json(UsersResponse { users }))
}
