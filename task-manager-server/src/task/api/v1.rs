use crate::task::{Task, TaskDraft, TaskRepositoryError, TaskState, TaskStatus};
use crate::web::api::v1::ErrorResponse;
use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderName, StatusCode, header},
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    id: u32,
    /// Short title of the task
    title: String,
    /// Freeform description of the task
    description: String,
    /// Current lifecycle status
    status: TaskStatus,
    /// Creation time, assigned by the server
    created_at: DateTime<Utc>,
    /// Completion time, present while the task is Completed
    completed_at: Option<DateTime<Utc>>,
    /// Numeric priority of the task
    priority: i32,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            status: task.status(),
            created_at: task.created_at(),
            completed_at: task.completed_at(),
            priority: task.priority(),
        }
    }
}

/// API response for listing all tasks.
#[derive(Debug, Serialize, ToSchema)]
pub struct TasksResponse {
    /// List of tasks
    tasks: Vec<TaskJson>,
    /// Total number of tasks
    count: usize,
}

/// Request body for creating a task.
///
/// Unknown fields, including any caller-supplied `id` or `created_at`, are
/// ignored; identifiers and timestamps are assigned by the server.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Title of the task
    #[serde(default)]
    title: String,
    /// Description of the task
    #[serde(default)]
    description: String,
    /// Initial status, defaults to Todo
    #[serde(default)]
    status: TaskStatus,
    /// Priority, defaults to 1
    #[serde(default = "default_priority")]
    priority: i32,
}

/// Request body for updating a task. Every field is overwritten.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    /// New title of the task
    #[serde(default)]
    title: String,
    /// New description of the task
    #[serde(default)]
    description: String,
    /// New status, defaults to Todo
    #[serde(default)]
    status: TaskStatus,
    /// New priority, defaults to 1
    #[serde(default = "default_priority")]
    priority: i32,
}

fn default_priority() -> i32 {
    1
}

impl From<CreateTaskRequest> for TaskDraft {
    fn from(request: CreateTaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
        }
    }
}

impl From<UpdateTaskRequest> for TaskDraft {
    fn from(request: UpdateTaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
        }
    }
}

fn error_response(err: &TaskRepositoryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        TaskRepositoryError::TaskNotFound(_) => StatusCode::NOT_FOUND,
        TaskRepositoryError::BlankTitle | TaskRepositoryError::PriorityOutOfRange(..) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    (status, Json(ErrorResponse::new(err.to_string())))
}

/// Handler for GET /api/v1/tasks - Returns all tasks in JSON format.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = TasksResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(State(state): State<Arc<TaskState>>) -> Json<TasksResponse> {
    let repository = state.repository.read().await;
    let tasks: Vec<TaskJson> = repository
        .list_all()
        .into_iter()
        .map(TaskJson::from)
        .collect();
    let count = tasks.len();

    Json(TasksResponse { tasks, count })
}

/// Handler for GET /api/v1/tasks/{id} - Returns a single task by its ID.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    params(
        ("id" = u32, Path, description = "ID of the task to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved task", body = TaskJson),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<u32>,
) -> Result<Json<TaskJson>, (StatusCode, Json<ErrorResponse>)> {
    let repository = state.repository.read().await;
    match repository.get_by_id(id) {
        Ok(task) => Ok(Json(TaskJson::from(task))),
        Err(err) => {
            tracing::warn!("Failed to get task {}: {}", id, err);
            Err(error_response(&err))
        }
    }
}

/// Handler for POST /api/v1/tasks - Creates a new task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskJson,
            headers(("Location" = String, description = "URL of the created task"))),
        (status = 422, description = "Draft rejected by validation rules", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<
    (StatusCode, [(HeaderName, String); 1], Json<TaskJson>),
    (StatusCode, Json<ErrorResponse>),
> {
    let mut repository = state.repository.write().await;
    match repository.create(TaskDraft::from(request)) {
        Ok(task) => {
            let location = format!("/api/v1/tasks/{}", task.id());
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(TaskJson::from(task)),
            ))
        }
        Err(err) => {
            tracing::warn!("Failed to create task: {}", err);
            Err(error_response(&err))
        }
    }
}

/// Handler for PUT /api/v1/tasks/{id} - Updates an existing task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(
        ("id" = u32, Path, description = "ID of the task to update")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Draft rejected by validation rules", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<u32>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskJson>, (StatusCode, Json<ErrorResponse>)> {
    let mut repository = state.repository.write().await;
    match repository.update(id, TaskDraft::from(request)) {
        Ok(task) => Ok(Json(TaskJson::from(task))),
        Err(err) => {
            tracing::warn!("Failed to update task {}: {}", id, err);
            Err(error_response(&err))
        }
    }
}

/// Handler for DELETE /api/v1/tasks/{id} - Deletes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(
        ("id" = u32, Path, description = "ID of the task to delete")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<u32>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let mut repository = state.repository.write().await;
    match repository.delete(id) {
        Ok(task) => {
            tracing::info!("Deleted task {}", task.id());
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => {
            tracing::warn!("Failed to delete task {}: {}", id, err);
            Err(error_response(&err))
        }
    }
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route(
            "/tasks",
            get(list_tasks_handler).post(create_task_handler),
        )
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
