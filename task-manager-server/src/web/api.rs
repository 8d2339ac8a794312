use std::sync::Arc;

use crate::task::TaskState;
use axum::Router;
use utoipa::OpenApi;

pub mod v1 {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    /// JSON error payload returned by API endpoints.
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ErrorResponse {
        /// Human-readable description of the failure
        error: String,
    }

    impl ErrorResponse {
        pub fn new(error: String) -> Self {
            Self { error }
        }
    }
}

/// OpenAPI documentation for the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::task::api::v1::list_tasks_handler,
        crate::task::api::v1::get_task_handler,
        crate::task::api::v1::create_task_handler,
        crate::task::api::v1::update_task_handler,
        crate::task::api::v1::delete_task_handler,
    ),
    components(schemas(
        crate::task::TaskStatus,
        crate::task::api::v1::TaskJson,
        crate::task::api::v1::TasksResponse,
        crate::task::api::v1::CreateTaskRequest,
        crate::task::api::v1::UpdateTaskRequest,
        v1::ErrorResponse,
    )),
    tags(
        (name = "Tasks", description = "Task management endpoints")
    )
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(task_state: Arc<TaskState>) -> Router {
    let tasks_router = crate::task::api::v1::create_api_router(task_state);
    Router::new().nest("/api/v1", tasks_router)
}
