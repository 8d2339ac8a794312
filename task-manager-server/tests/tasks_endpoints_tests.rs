use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use task_manager_server::task::{TaskRepository, TaskState, ValidationRules};
use task_manager_server::web::create_app_router;
use tower::ServiceExt;

/// Builds the full application router over a fresh seeded repository.
fn create_test_app() -> Router {
    let repository = TaskRepository::with_sample_tasks(ValidationRules::default());
    create_app_router(Arc::new(TaskState::new(repository)))
}

/// Sends a request to the app, with a JSON body when one is given.
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn can_list_seeded_tasks() {
    let app = create_test_app();

    let response = send(&app, Method::GET, "/api/v1/tasks", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["count"], 3);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks[0]["id"], 1);
    assert_eq!(tasks[0]["status"], "Completed");
    assert!(!tasks[0]["completed_at"].is_null());
    assert_eq!(tasks[1]["id"], 2);
    assert_eq!(tasks[1]["status"], "InProgress");
    assert_eq!(tasks[1]["priority"], 2);
    assert_eq!(tasks[2]["id"], 3);
    assert_eq!(tasks[2]["status"], "Todo");
}

#[tokio::test]
async fn can_get_task_by_id() {
    let app = create_test_app();

    let response = send(&app, Method::GET, "/api/v1/tasks/2", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["title"], "Create API endpoints");
    assert_eq!(body["description"], "Build CRUD endpoints for tasks");
    assert!(body["completed_at"].is_null());
}

#[tokio::test]
async fn get_missing_task_returns_not_found() {
    let app = create_test_app();

    let response = send(&app, Method::GET, "/api/v1/tasks/99", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Task with ID 99 not found");
}

#[tokio::test]
async fn can_create_task() {
    let app = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/api/v1/tasks",
        Some(json!({
            "title": "Write deployment docs",
            "description": "Document the release process",
            "priority": 3
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/api/v1/tasks/4"
    );
    let body = response_json(response).await;
    assert_eq!(body["id"], 4);
    assert_eq!(body["title"], "Write deployment docs");
    assert_eq!(body["status"], "Todo");
    assert_eq!(body["priority"], 3);
    assert!(!body["created_at"].is_null());
    assert!(body["completed_at"].is_null());

    let list = response_json(send(&app, Method::GET, "/api/v1/tasks", None).await).await;
    assert_eq!(list["count"], 4);
}

#[tokio::test]
async fn create_applies_defaults() {
    let app = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/api/v1/tasks",
        Some(json!({"title": "Only a title"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["description"], "");
    assert_eq!(body["status"], "Todo");
    assert_eq!(body["priority"], 1);
}

#[tokio::test]
async fn create_ignores_caller_supplied_id() {
    let app = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/api/v1/tasks",
        Some(json!({
            "id": 999,
            "created_at": "1999-01-01T00:00:00Z",
            "title": "Pick my own ID"
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["id"], 4);
    assert_ne!(body["created_at"], "1999-01-01T00:00:00Z");
}

#[tokio::test]
async fn create_with_blank_title_is_rejected() {
    let app = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/api/v1/tasks",
        Some(json!({"title": "   "})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Task title must not be blank");

    let list = response_json(send(&app, Method::GET, "/api/v1/tasks", None).await).await;
    assert_eq!(list["count"], 3);
}

#[tokio::test]
async fn create_with_out_of_range_priority_is_rejected() {
    let app = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/api/v1/tasks",
        Some(json!({"title": "Too urgent", "priority": 9})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(
        body["error"],
        "Task priority 9 is outside the allowed range 1..=5"
    );
}

#[tokio::test]
async fn can_update_task() {
    let app = create_test_app();
    let before = response_json(send(&app, Method::GET, "/api/v1/tasks/3", None).await).await;

    let response = send(
        &app,
        Method::PUT,
        "/api/v1/tasks/3",
        Some(json!({
            "title": "Add OAuth",
            "description": "Implement OAuth login",
            "status": "InProgress",
            "priority": 3
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["id"], 3);
    assert_eq!(body["title"], "Add OAuth");
    assert_eq!(body["status"], "InProgress");
    assert_eq!(body["priority"], 3);
    assert_eq!(body["created_at"], before["created_at"]);
}

#[tokio::test]
async fn update_to_completed_stamps_completion_time() {
    let app = create_test_app();

    let response = send(
        &app,
        Method::PUT,
        "/api/v1/tasks/2",
        Some(json!({
            "title": "Create API endpoints",
            "description": "Build CRUD endpoints for tasks",
            "status": "Completed",
            "priority": 2
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "Completed");
    assert!(!body["completed_at"].is_null());
}

#[tokio::test]
async fn update_away_from_completed_clears_completion_time() {
    let app = create_test_app();

    let response = send(
        &app,
        Method::PUT,
        "/api/v1/tasks/1",
        Some(json!({
            "title": "Setup project",
            "description": "Initialize the task manager API",
            "status": "Todo",
            "priority": 1
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "Todo");
    assert!(body["completed_at"].is_null());
}

#[tokio::test]
async fn update_missing_task_returns_not_found() {
    let app = create_test_app();

    let response = send(
        &app,
        Method::PUT,
        "/api/v1/tasks/99",
        Some(json!({"title": "Ghost task"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Task with ID 99 not found");
}

#[tokio::test]
async fn can_delete_task() {
    let app = create_test_app();

    let response = send(&app, Method::DELETE, "/api/v1/tasks/2", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, Method::GET, "/api/v1/tasks/2", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A later create must not reuse the deleted slot's id range.
    let response = send(
        &app,
        Method::POST,
        "/api/v1/tasks",
        Some(json!({"title": "After delete"})),
    )
    .await;
    let body = response_json(response).await;
    assert_eq!(body["id"], 4);
}

#[tokio::test]
async fn delete_missing_task_returns_not_found() {
    let app = create_test_app();

    let response = send(&app, Method::DELETE, "/api/v1/tasks/99", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let list = response_json(send(&app, Method::GET, "/api/v1/tasks", None).await).await;
    assert_eq!(list["count"], 3);
}

#[tokio::test]
async fn can_check_health_endpoint() {
    let app = create_test_app();

    let response = send(&app, Method::GET, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn can_get_api_info() {
    let app = create_test_app();

    let response = send(&app, Method::GET, "/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Task Manager API");
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 5);
}
