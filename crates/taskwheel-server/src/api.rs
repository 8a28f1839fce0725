use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;

use taskwheel_core::error::CoreError;
use taskwheel_core::models::{CompletionResult, NewTaskData, Task};
use taskwheel_core::recurrence;
use taskwheel_core::repository::TaskRepository;

use crate::state::AppState;

/// Maximum number of tasks returned by the list endpoint.
const LIST_LIMIT: u32 = 50;

// ── Error mapping ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler-level error carrying the HTTP status it maps to.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        // Validation failures are the caller's problem; everything else is
        // a storage fault.
        let status = match &err {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::InvalidInput(_) | CoreError::Recurrence(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
pub struct Empty {}

// ── Next date ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NextDateParams {
    #[serde(default)]
    pub now: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub repeat: String,
}

/// `GET /api/nextdate`: pure recurrence lookup, plain-text response.
///
/// `now` is overridable for clients that want a reference date other than
/// today.
pub async fn next_date(Query(params): Query<NextDateParams>) -> Result<String, ApiError> {
    let now = if params.now.is_empty() {
        Local::now().date_naive()
    } else {
        recurrence::parse_date(&params.now)
            .map_err(|_| ApiError::bad_request("invalid now parameter"))?
    };

    let next = recurrence::next_date(now, &params.date, &params.repeat)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    Ok(next)
}

// ── Task CRUD ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TaskCreated {
    pub id: String,
}

/// `POST /api/task`
pub async fn add_task(
    State(state): State<Arc<AppState>>,
    Json(data): Json<NewTaskData>,
) -> Result<Json<TaskCreated>, ApiError> {
    let task = state.repo.add_task(data).await?;
    debug!("created task {} due {}", task.id, task.date);
    Ok(Json(TaskCreated {
        id: task.id.to_string(),
    }))
}

#[derive(Deserialize)]
pub struct IdParams {
    #[serde(default)]
    pub id: String,
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() {
        return Err(ApiError::bad_request("task id is required"));
    }
    raw.parse()
        .map_err(|_| ApiError::bad_request("invalid task id"))
}

/// `GET /api/task?id=`
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&params.id)?;
    let task = state
        .repo
        .find_task_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("task not found"))?;
    Ok(Json(task))
}

/// `PUT /api/task`: full-row update.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Json(task): Json<Task>,
) -> Result<Json<Empty>, ApiError> {
    state.repo.update_task(task).await?;
    Ok(Json(Empty {}))
}

/// `DELETE /api/task?id=`
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<Empty>, ApiError> {
    let id = parse_id(&params.id)?;
    state.repo.delete_task(id).await?;
    debug!("deleted task {}", id);
    Ok(Json(Empty {}))
}

/// `POST /api/task/done?id=`: completion semantics live in the repository:
/// one-shot tasks are removed, recurring tasks advance to their next
/// occurrence.
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<Empty>, ApiError> {
    let id = parse_id(&params.id)?;
    match state.repo.complete_task(id).await? {
        CompletionResult::Finished => debug!("task {} finished", id),
        CompletionResult::Rescheduled(task) => {
            debug!("task {} rescheduled to {}", id, task.date)
        }
    }
    Ok(Json(Empty {}))
}

// ── Task list ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// `GET /api/tasks[?search=]`
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let tasks = state
        .repo
        .find_tasks(params.search.as_deref(), LIST_LIMIT)
        .await?;
    Ok(Json(TaskListResponse { tasks }))
}
