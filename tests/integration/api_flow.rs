//! ApiClient contract tests against a wiremock server.

use chrono::NaiveDate;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskdeck::api::ApiClient;
use taskdeck::session::Session;
use taskdeck::task::{EditBuffer, Priority, TaskDraft, TaskId};
use taskdeck::Error;

fn draft() -> TaskDraft {
    TaskDraft {
        title: "t".to_string(),
        description: "d".to_string(),
        due_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        priority: Priority::Low,
        assigned_to: "u1".to_string(),
    }
}

#[tokio::test]
async fn test_login_sends_credentials_and_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "a@b.com",
            "password": "x"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "T1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let session = api.login("a@b.com", "x").await.unwrap();
    assert_eq!(session.token, "T1");
    assert_eq!(session.bearer(), "Bearer T1");
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "msg": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let err = api.login("a@b.com", "wrong").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("Expected Error::Api, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_failure_without_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let err = api.login("a@b.com", "x").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed");
}

#[tokio::test]
async fn test_register_posts_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(serde_json::json!({
            "name": "Ada",
            "email": "a@b.com",
            "password": "x"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    api.register("Ada", "a@b.com", "x").await.unwrap();
}

#[tokio::test]
async fn test_register_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "msg": "Email already in use" })),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let err = api.register("Ada", "a@b.com", "x").await.unwrap_err();
    assert_eq!(err.to_string(), "Email already in use");
}

#[tokio::test]
async fn test_list_tasks_parses_server_order_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "_id": "b",
                "title": "second created, listed first",
                "description": "",
                "dueDate": "2026-04-01T00:00:00.000Z",
                "priority": "high",
                "status": "in progress",
                "assignedTo": "u1",
                "createdBy": "u2"
            },
            {
                "_id": "a",
                "title": "first created, listed second",
                "description": "notes",
                "dueDate": "2026-03-01T00:00:00.000Z",
                "priority": "low",
                "status": "pending",
                "assignedTo": "u3",
                "createdBy": "u2"
            }
        ])))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let session = Session::new("T1".to_string());
    let tasks = api.list_tasks(&session).await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, TaskId::new("b"), "Server order is preserved");
    assert_eq!(tasks[0].priority, Priority::High);
    assert_eq!(tasks[1].id, TaskId::new("a"));
    assert_eq!(tasks[1].description, "notes");
}

#[tokio::test]
async fn test_create_task_requires_exactly_201() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer T1"))
        .and(body_json(serde_json::json!({
            "title": "t",
            "description": "d",
            "dueDate": "2026-03-01",
            "priority": "low",
            "assignedTo": "u1"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let session = Session::new("T1".to_string());
    api.create_task(&session, &draft()).await.unwrap();
}

#[tokio::test]
async fn test_create_task_other_2xx_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let session = Session::new("T1".to_string());
    let err = api.create_task(&session, &draft()).await.unwrap_err();
    assert_eq!(err.to_string(), "Task creation failed");
}

#[tokio::test]
async fn test_update_task_puts_full_buffer_to_id_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/42"))
        .and(header("Authorization", "Bearer T1"))
        .and(body_json(serde_json::json!({
            "title": "t",
            "description": "",
            "dueDate": "2026-03-01",
            "priority": "high",
            "status": "pending",
            "assignedTo": "u1"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let session = Session::new("T1".to_string());
    let buffer = EditBuffer {
        title: "t".to_string(),
        description: String::new(),
        due_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        priority: Priority::High,
        status: "pending".to_string(),
        assigned_to: "u1".to_string(),
    };
    api.update_task(&session, &TaskId::new("42"), &buffer)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_task_hits_id_path_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/42"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let session = Session::new("T1".to_string());
    api.delete_task(&session, &TaskId::new("42")).await.unwrap();
}

#[tokio::test]
async fn test_expired_token_is_an_ordinary_failure() {
    // No special handling for 401 on task routes: it surfaces like any
    // other failed request
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({ "msg": "Token expired" })),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let session = Session::new("stale".to_string());
    let err = api.list_tasks(&session).await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Token expired");
        }
        other => panic!("Expected Error::Api, got {other:?}"),
    }
}
