//! Server core: shared state, the router, and startup.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};

use crate::auth::Sessions;
use crate::store::Store;
use crate::topics::TopicRegistry;
use crate::{activity, auth, boards, lists, tasks, ws};

/// Shared application state handed to every handler.
pub struct AppState {
    /// The in-memory database.
    pub store: Store,
    /// Live session tokens.
    pub sessions: Sessions,
    /// Board topic subscriptions for realtime fan-out.
    pub topics: TopicRegistry,
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates fresh state with the default bcrypt work factor.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bcrypt_cost(bcrypt::DEFAULT_COST)
    }

    /// Creates fresh state with a custom bcrypt work factor.
    ///
    /// Tests use a low cost so signup does not dominate runtime.
    #[must_use]
    pub fn with_bcrypt_cost(bcrypt_cost: u32) -> Self {
        Self {
            store: Store::new(),
            sessions: Sessions::new(),
            topics: TopicRegistry::new(),
            bcrypt_cost,
        }
    }
}

/// Builds the full application router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/users", get(auth::search_users))
        .route("/api/boards", get(boards::list_boards).post(boards::create_board))
        .route(
            "/api/boards/{id}",
            get(boards::get_board)
                .put(boards::update_board)
                .delete(boards::delete_board),
        )
        .route("/api/boards/{id}/members", post(boards::add_member))
        .route("/api/boards/{id}/activity", get(activity::board_activity))
        .route("/api/boards/{id}/lists", post(lists::create_list))
        .route("/api/lists/reorder", put(lists::reorder_lists))
        .route(
            "/api/lists/{id}",
            put(lists::rename_list).delete(lists::delete_list),
        )
        .route("/api/lists/{id}/tasks", post(tasks::create_task))
        .route("/api/tasks/reorder", put(tasks::reorder_tasks))
        .route("/api/tasks/search", get(tasks::search_tasks))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/tasks/{id}/assign", post(tasks::assign_task))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}

/// Starts the server on the given address and returns the bound address
/// and a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(AppState::new())).await
}

/// Starts the server with pre-configured [`AppState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<AppState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((bound_addr, handle))
}
