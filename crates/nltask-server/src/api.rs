//! JSON HTTP API over the task service.
//!
//! - `GET /api/tasks` lists every task as `{"tasks": [...]}`
//! - `POST /api/tasks` with `{"raw_text": "..."}` creates a task (201)
//! - `DELETE /api/tasks/:id` removes a task (204, also for unknown ids)
//!
//! Failures are reported as 400 with `{"error": "..."}`.

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use nltask_core::models::{Task, TaskList};
use nltask_core::service::TaskService;
use serde::Deserialize;
use tracing::error;

/// Build the API router
pub fn build_router(service: Arc<TaskService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", axum::routing::delete(delete_task))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct CreateTaskRequest {
    raw_text: String,
}

/// Error body returned to API callers
struct ApiError {
    message: String,
}

impl ApiError {
    fn new(action: &str, cause: impl Display) -> Self {
        let message = format!("Failed to {}: {}", action, cause);
        error!("{}", message);
        Self { message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tasks(State(service): State<Arc<TaskService>>) -> Result<Json<TaskList>, ApiError> {
    let tasks = service
        .list_tasks()
        .await
        .map_err(|e| ApiError::new("load tasks", e))?;
    Ok(Json(TaskList { tasks }))
}

async fn create_task(
    State(service): State<Arc<TaskService>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::new("create task", e.body_text()))?;

    let task = service
        .create_task(&request.raw_text)
        .await
        .map_err(|e| ApiError::new("create task", e))?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn delete_task(
    State(service): State<Arc<TaskService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service
        .delete_task(&id)
        .await
        .map_err(|e| ApiError::new("delete task", e))?;
    Ok(StatusCode::NO_CONTENT)
}
