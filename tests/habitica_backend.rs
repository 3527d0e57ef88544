//! Habitica client contract tests against a mock HTTP server.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notion_habitica_sync::backend::habitica::HabiticaBackend;
use notion_habitica_sync::backend::{BackendError, CreateTodoArgs, TrackerBackend, TrackerTask};
use notion_habitica_sync::config::HabiticaConfig;

fn backend(server: &MockServer) -> HabiticaBackend {
    let config = HabiticaConfig {
        base_url: server.uri(),
        ..HabiticaConfig::default()
    };
    HabiticaBackend::new(&config, "user-1", "key-1", Duration::from_secs(5)).unwrap()
}

fn ok_empty() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": {} }))
}

#[tokio::test]
async fn test_fetch_open_tasks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/tasks/user"))
        .and(query_param("type", "todos"))
        .and(header("x-api-user", "user-1"))
        .and(header("x-api-key", "key-1"))
        .and(header("x-client", "user-1-notion-habitica-sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "id": "h1", "text": "BUY MILK ***(TO DO)***", "alias": "notion-A1", "type": "todo" },
                { "id": "h2", "text": "Manual to-do", "type": "todo" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = backend(&server).fetch_open_tasks().await.unwrap();

    assert_eq!(
        tasks,
        vec![
            TrackerTask {
                id: "h1".to_string(),
                name: "BUY MILK ***(TO DO)***".to_string(),
                alias: "notion-A1".to_string(),
                done: false,
            },
            TrackerTask {
                id: "h2".to_string(),
                name: "Manual to-do".to_string(),
                alias: String::new(),
                done: false,
            },
        ]
    );
}

#[tokio::test]
async fn test_fetch_completed_tasks_are_done() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/tasks/user"))
        .and(query_param("type", "completedTodos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "id": "h3", "text": "OLD", "alias": "notion-A3", "completed": true }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = backend(&server).fetch_completed_tasks().await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].done);
    assert_eq!(tasks[0].alias, "notion-A3");
}

#[tokio::test]
async fn test_create_task_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/tasks/user"))
        .and(body_json(json!({
            "text": "BUY MILK ***(TO DO)***",
            "type": "todo",
            "alias": "notion-A1",
            "priority": 1.5
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true, "data": { "id": "h1" } })))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server)
        .create_task(CreateTodoArgs {
            text: "BUY MILK ***(TO DO)***".to_string(),
            alias: "notion-A1".to_string(),
            priority: 1.5,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rename_score_and_delete_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v3/tasks/h1"))
        .and(body_json(json!({ "text": "NEW NAME" })))
        .respond_with(ok_empty())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/tasks/h1/score/up"))
        .respond_with(ok_empty())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v3/tasks/h1"))
        .respond_with(ok_empty())
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.rename_task("h1", "NEW NAME").await.unwrap();
    backend.score_task("h1").await.unwrap();
    backend.delete_task("h1").await.unwrap();
}

#[tokio::test]
async fn test_missing_task_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v3/tasks/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": "NotFound",
            "message": "Task not found."
        })))
        .mount(&server)
        .await;

    let err = backend(&server).delete_task("gone").await.unwrap_err();
    assert!(matches!(err, BackendError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_maps_to_network_error() {
    let config = HabiticaConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..HabiticaConfig::default()
    };
    let backend = HabiticaBackend::new(&config, "user-1", "key-1", Duration::from_secs(2)).unwrap();

    let err = backend.fetch_open_tasks().await.unwrap_err();
    assert!(matches!(err, BackendError::Network(_)), "got {err:?}");
}
