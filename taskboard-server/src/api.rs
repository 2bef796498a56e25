//! HTTP surface: shared state, request/response types, CRUD handlers, and
//! router construction.
//!
//! Handlers are deliberately thin: they parse and validate input, call the
//! synchronous store API, flush the store after every mutation, and map
//! errors to status codes. Partial-field update semantics live here, not in
//! the store — the handler fetches the current record, merges only the
//! fields the client supplied, and re-submits the full value.
//!
//! Persistence follows the store's contract: a mutation is applied to
//! memory first and `save` runs after, so a failed save returns a 500 while
//! the in-memory change stands.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use taskboard_core::store::{StoreError, TaskStore};
use taskboard_core::task::{MAX_TASK_TITLE_LENGTH, Task};
use tower_http::trace::TraceLayer;

/// Shared server state holding the task store.
pub struct AppState {
    /// The task collection and its persistence.
    pub store: TaskStore,
}

impl AppState {
    /// Creates server state around an already-constructed store.
    #[must_use]
    pub const fn new(store: TaskStore) -> Self {
        Self { store }
    }
}

/// Errors produced by the HTTP layer, mapped to status codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was syntactically valid but semantically rejected.
    #[error("{0}")]
    InvalidInput(String),

    /// The referenced task does not exist.
    #[error("task not found")]
    NotFound,

    /// The store failed to persist or reload its state.
    #[error("failed to persist tasks: {0}")]
    Persistence(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            other => Self::Persistence(other),
        }
    }
}

impl ApiError {
    /// The status code this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body returned for every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Title of the new task; trimmed and required non-empty.
    pub title: Option<String>,
}

/// Body of `PUT /tasks/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title, trimmed and required non-empty when present.
    pub title: Option<String>,
    /// New completion flag.
    pub done: Option<bool>,
}

/// Trims a raw title and rejects empty or overlong results.
fn validate_title(raw: &str) -> Result<String, ApiError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::InvalidInput(
            "title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TASK_TITLE_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "title exceeds {MAX_TASK_TITLE_LENGTH} characters"
        )));
    }
    Ok(title.to_string())
}

/// Rejects ids that could never have been issued by the store.
fn validate_id(id: i64) -> Result<(), ApiError> {
    if id <= 0 {
        return Err(ApiError::InvalidInput("id must be positive".to_string()));
    }
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    Json(state.store.list())
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let title = validate_title(req.title.as_deref().unwrap_or_default())?;
    let task = state.store.create(title);
    tracing::debug!(id = task.id, "task created");
    state.store.save()?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    validate_id(id)?;
    let task = state.store.get(id)?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    validate_id(id)?;
    let mut task = state.store.get(id)?;
    if let Some(raw) = req.title.as_deref() {
        task.title = validate_title(raw)?;
    }
    if let Some(done) = req.done {
        task.done = done;
    }
    state.store.update(task.clone())?;
    tracing::debug!(id = task.id, "task updated");
    state.store.save()?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    validate_id(id)?;
    state.store.delete(id)?;
    tracing::debug!(id, "task deleted");
    state.store.save()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Builds the application router with all routes and request tracing.
#[must_use]
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/healthz", get(healthz))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the server on the given address and returns the bound address and
/// a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code.
/// The spawned server shuts down gracefully on ctrl-c or SIGTERM.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
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
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}

/// Resolves when the process receives ctrl-c or (on unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}

/// Starts the server in-process for testing.
///
/// Binds to `127.0.0.1:0` (OS-assigned port) with a purely in-memory store
/// and returns the bound address and a [`tokio::task::JoinHandle`] for
/// cleanup.
#[cfg(test)]
async fn start_test_server() -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let state = Arc::new(AppState::new(TaskStore::new(None)));
    start_server("127.0.0.1:0", state)
        .await
        .expect("failed to start test server")
}
