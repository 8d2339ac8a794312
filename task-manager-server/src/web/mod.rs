use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config;
use crate::task::{TaskRepository, TaskState, ValidationRules};

pub mod api;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let repository = TaskRepository::with_sample_tasks(ValidationRules::default());
    let task_state = Arc::new(TaskState::new(repository));
    let app = create_app_router(task_state);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Assembles the application router: public endpoints, the JSON API, and the
/// Swagger UI.
pub fn create_app_router(task_state: Arc<TaskState>) -> axum::Router {
    use axum::Router;

    let api_router = api::create_api_router(task_state);

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .route("/", axum::routing::get(api_info_handler))
        .merge(api_router)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Service metadata returned by the root endpoint.
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    name: &'static str,
    version: &'static str,
    endpoints: [&'static str; 5],
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for GET / - Returns the service name, version, and endpoint list.
#[tracing::instrument]
pub async fn api_info_handler() -> axum::response::Json<ApiInfo> {
    axum::response::Json(ApiInfo {
        name: "Task Manager API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: [
            "GET /api/v1/tasks - Get all tasks",
            "GET /api/v1/tasks/{id} - Get task by ID",
            "POST /api/v1/tasks - Create new task",
            "PUT /api/v1/tasks/{id} - Update task",
            "DELETE /api/v1/tasks/{id} - Delete task",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn can_report_api_info() {
        let axum::response::Json(info) = api_info_handler().await;

        assert_eq!(info.name, "Task Manager API");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.endpoints.len(), 5);
    }

    #[tokio::test]
    async fn can_check_health() {
        assert_eq!(health_check_handler().await, "OK");
    }
}
