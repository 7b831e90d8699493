//! HTTP client for the Tackboard API.
//!
//! Thin typed wrapper over reqwest. Signup and login capture the
//! session token; every later call sends it as a bearer header. Error
//! responses are surfaced as [`ClientError::Api`] with the server's
//! status and message.

use serde::de::DeserializeOwned;
use tackboard_proto::id::{BoardId, ListId, TaskId, UserId};
use tackboard_proto::model::{Activity, Board, List, Task, UserProfile};
use tackboard_proto::rest::{
    ActivityPage, AddMemberRequest, AssignRequest, AuthResponse, BoardDetail, BoardResponse,
    BoardsPage, CreateBoardRequest, CreateListRequest, CreateTaskRequest, ListResponse,
    LoginRequest, MessageResponse, PageQuery, RenameListRequest, ReorderListsRequest,
    ReorderTasksRequest, SignupRequest, TaskResponse, TaskSearchPage, UpdateBoardRequest,
    UpdateTaskRequest, UserResponse, UsersResponse,
};
use url::Url;

/// Errors from API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response body was invalid.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The base URL or a derived endpoint URL is invalid.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// The server answered with an error status.
    #[error("server returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The server's error message.
        message: String,
    },
}

/// Typed client for one Tackboard server.
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for a server base URL such as
    /// `http://127.0.0.1:5000`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Url`] if the base URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(base_url)?,
            token: None,
        })
    }

    /// The current session token, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replaces the session token, e.g. one restored from disk.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = match response.json::<MessageResponse>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // ---- auth ----

    /// Creates an account and stores its session token.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with 400 on a bad body, 409 on a duplicate
    /// email.
    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let url = self.endpoint("/api/auth/signup")?;
        let body = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.execute(self.http.post(url).json(&body)).await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    /// Logs in and stores the session token.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with 401 on bad credentials.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let url = self.endpoint("/api/auth/login")?;
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.execute(self.http.post(url).json(&body)).await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    /// Fetches the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with 401 without a live session.
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let url = self.endpoint("/api/auth/me")?;
        let response: UserResponse = self.execute(self.http.get(url)).await?;
        Ok(response.user)
    }

    /// Searches accounts by name or email, excluding the caller.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserProfile>, ClientError> {
        let url = self.endpoint("/api/auth/users")?;
        let response: UsersResponse = self
            .execute(self.http.get(url).query(&[("q", query)]))
            .await?;
        Ok(response.users)
    }

    // ---- boards ----

    /// One page of the caller's boards.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn boards(&self, page: PageQuery) -> Result<BoardsPage, ClientError> {
        let url = self.endpoint("/api/boards")?;
        self.execute(
            self.http
                .get(url)
                .query(&[("page", page.page), ("limit", page.limit)]),
        )
        .await
    }

    /// Creates a board.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn create_board(&self, request: &CreateBoardRequest) -> Result<Board, ClientError> {
        let url = self.endpoint("/api/boards")?;
        let response: BoardResponse = self.execute(self.http.post(url).json(request)).await?;
        Ok(response.board)
    }

    /// Fetches a board plus its members, lists, and tasks.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with 404 for an unknown board, 403 for a
    /// board the caller is not a member of.
    pub async fn board(&self, id: BoardId) -> Result<BoardDetail, ClientError> {
        let url = self.endpoint(&format!("/api/boards/{id}"))?;
        self.execute(self.http.get(url)).await
    }

    /// Updates board fields. Owner only.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn update_board(
        &self,
        id: BoardId,
        request: &UpdateBoardRequest,
    ) -> Result<Board, ClientError> {
        let url = self.endpoint(&format!("/api/boards/{id}"))?;
        let response: BoardResponse = self.execute(self.http.put(url).json(request)).await?;
        Ok(response.board)
    }

    /// Deletes a board and everything on it. Owner only.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn delete_board(&self, id: BoardId) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("/api/boards/{id}"))?;
        let _: MessageResponse = self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    /// Adds a member by email. Owner only.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn add_member(&self, id: BoardId, email: &str) -> Result<Board, ClientError> {
        let url = self.endpoint(&format!("/api/boards/{id}/members"))?;
        let body = AddMemberRequest {
            email: email.to_string(),
        };
        let response: BoardResponse = self.execute(self.http.post(url).json(&body)).await?;
        Ok(response.board)
    }

    /// One page of a board's activity feed, newest first.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn board_activity(
        &self,
        id: BoardId,
        page: PageQuery,
    ) -> Result<Vec<Activity>, ClientError> {
        let url = self.endpoint(&format!("/api/boards/{id}/activity"))?;
        let response: ActivityPage = self
            .execute(
                self.http
                    .get(url)
                    .query(&[("page", page.page), ("limit", page.limit)]),
            )
            .await?;
        Ok(response.activities)
    }

    // ---- lists ----

    /// Creates a list at the end of a board.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn create_list(
        &self,
        board: BoardId,
        request: &CreateListRequest,
    ) -> Result<List, ClientError> {
        let url = self.endpoint(&format!("/api/boards/{board}/lists"))?;
        let response: ListResponse = self.execute(self.http.post(url).json(request)).await?;
        Ok(response.list)
    }

    /// Renames a list.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn rename_list(&self, id: ListId, title: &str) -> Result<List, ClientError> {
        let url = self.endpoint(&format!("/api/lists/{id}"))?;
        let body = RenameListRequest {
            title: title.to_string(),
        };
        let response: ListResponse = self.execute(self.http.put(url).json(&body)).await?;
        Ok(response.list)
    }

    /// Deletes a list and every task in it.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn delete_list(&self, id: ListId) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("/api/lists/{id}"))?;
        let _: MessageResponse = self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    /// Submits a list reorder batch.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn reorder_lists(&self, request: &ReorderListsRequest) -> Result<(), ClientError> {
        let url = self.endpoint("/api/lists/reorder")?;
        let _: MessageResponse = self.execute(self.http.put(url).json(request)).await?;
        Ok(())
    }

    // ---- tasks ----

    /// Creates a task at the end of a list.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn create_task(
        &self,
        list: ListId,
        request: &CreateTaskRequest,
    ) -> Result<Task, ClientError> {
        let url = self.endpoint(&format!("/api/lists/{list}/tasks"))?;
        let response: TaskResponse = self.execute(self.http.post(url).json(request)).await?;
        Ok(response.task)
    }

    /// Fetches one task.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn task(&self, id: TaskId) -> Result<Task, ClientError> {
        let url = self.endpoint(&format!("/api/tasks/{id}"))?;
        let response: TaskResponse = self.execute(self.http.get(url)).await?;
        Ok(response.task)
    }

    /// Updates task fields.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn update_task(
        &self,
        id: TaskId,
        request: &UpdateTaskRequest,
    ) -> Result<Task, ClientError> {
        let url = self.endpoint(&format!("/api/tasks/{id}"))?;
        let response: TaskResponse = self.execute(self.http.put(url).json(request)).await?;
        Ok(response.task)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("/api/tasks/{id}"))?;
        let _: MessageResponse = self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    /// Toggles a user's assignment on a task.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn assign_task(&self, id: TaskId, user: UserId) -> Result<Task, ClientError> {
        let url = self.endpoint(&format!("/api/tasks/{id}/assign"))?;
        let body = AssignRequest { user };
        let response: TaskResponse = self.execute(self.http.post(url).json(&body)).await?;
        Ok(response.task)
    }

    /// Submits a task reorder batch, e.g. one produced by
    /// [`crate::drag::DragSession::drop_on`].
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn reorder_tasks(&self, request: &ReorderTasksRequest) -> Result<(), ClientError> {
        let url = self.endpoint("/api/tasks/reorder")?;
        let _: MessageResponse = self.execute(self.http.put(url).json(request)).await?;
        Ok(())
    }

    /// Searches tasks across the caller's boards.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] on any error status.
    pub async fn search_tasks(
        &self,
        query: &str,
        page: PageQuery,
    ) -> Result<TaskSearchPage, ClientError> {
        let url = self.endpoint("/api/tasks/search")?;
        self.execute(
            self.http
                .get(url)
                .query(&[("q", query.to_string())])
                .query(&[("page", page.page), ("limit", page.limit)]),
        )
        .await
    }
}
