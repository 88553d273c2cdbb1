//! API integration tests, driven in-process against the real router

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tower::ServiceExt;

use lending_ledger::{api, AppConfig, AppState};

const ADMIN: &str = "0xadmin";
const IDENTITY_HEADER: &str = "x-caller-identity";

fn app() -> Router {
    app_with(AppConfig::default())
}

fn app_with(mut config: AppConfig) -> Router {
    config.ledger.admin = ADMIN.to_string();
    api::create_router(AppState::new(config).expect("Failed to build state"))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    caller: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    if let Some(caller) = caller {
        builder = builder.header(IDENTITY_HEADER, caller);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response is not JSON")
    };
    (status, value)
}

async fn add_dune(app: &Router, copies: i64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        Some(ADMIN),
        Some(json!({ "title": "Dune", "author": "Herbert", "copies": copies })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_lending_scenario() {
    let app = app();

    for member in ["0xm", "0xn", "0xo"] {
        let (status, _) = send(&app, Method::POST, "/members", Some(member), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let book = add_dune(&app, 2).await;
    assert_eq!(book["id"], 1);
    assert_eq!(book["available_copies"], 2);

    let (status, borrowing) = send(&app, Method::POST, "/books/1/borrow", Some("0xm"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(borrowing["returned"], false);

    let (_, details) = send(&app, Method::GET, "/books/1", None, None).await;
    assert_eq!(details["available_copies"], 1);

    let (status, _) = send(&app, Method::POST, "/books/1/borrow", Some("0xn"), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = send(&app, Method::POST, "/books/1/borrow", Some("0xo"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "BookNotAvailable");
    assert_eq!(error["retryable"], false);

    let (_, availability) = send(&app, Method::GET, "/books/1/availability", None, None).await;
    assert_eq!(availability["available"], false);

    let (status, returned) = send(&app, Method::POST, "/books/1/return", Some("0xm"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["returned"], true);
    assert!(returned["return_date"].is_string());

    let (_, details) = send(&app, Method::GET, "/books/1", None, None).await;
    assert_eq!(details["available_copies"], 1);

    let (status, history) = send(&app, Method::GET, "/me/borrowings", Some("0xm"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["title"], "Dune");
    assert_eq!(history[0]["state"], "returned");
}

#[tokio::test]
async fn test_missing_identity_is_unauthenticated() {
    let app = app();
    add_dune(&app, 1).await;

    let (status, error) = send(&app, Method::POST, "/books/1/borrow", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"], "Unauthenticated");

    let (status, _) = send(&app, Method::POST, "/members", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unregistered_caller_cannot_borrow() {
    let app = app();
    add_dune(&app, 1).await;

    let (status, error) = send(&app, Method::POST, "/books/1/borrow", Some("0xstranger"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"], "PermissionDenied");

    let (_, details) = send(&app, Method::GET, "/books/1", None, None).await;
    assert_eq!(details["available_copies"], 1);
}

#[tokio::test]
async fn test_non_admin_cannot_change_catalog() {
    let app = app();
    add_dune(&app, 1).await;
    send(&app, Method::POST, "/members", Some("0xm"), None).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/books",
        Some("0xm"),
        Some(json!({ "title": "Emma", "author": "Austen", "copies": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/books/1",
        Some("0xm"),
        Some(json!({ "title": "Dune", "author": "Herbert", "copies": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, books) = send(&app, Method::GET, "/books", None, None).await;
    assert_eq!(books.as_array().map(Vec::len), Some(1));
    assert_eq!(books[0]["total_copies"], 1);
}

#[tokio::test]
async fn test_invalid_book_input() {
    let app = app();
    let (status, error) = send(
        &app,
        Method::POST,
        "/books",
        Some(ADMIN),
        Some(json!({ "title": "", "author": "Herbert", "copies": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "InvalidArgument");

    let (status, _) = send(
        &app,
        Method::POST,
        "/books",
        Some(ADMIN),
        Some(json!({ "title": "Dune", "author": "Herbert", "copies": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_book_body_is_invalid_argument() {
    let app = app();
    for body in [
        json!({ "title": "Dune", "author": "Herbert" }),
        json!({ "title": "Dune", "author": "Herbert", "copies": "two" }),
        json!({ "title": "Dune", "author": "Herbert", "copies": 4294967296u64 }),
    ] {
        let (status, error) = send(&app, Method::POST, "/books", Some(ADMIN), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "InvalidArgument");
        assert_eq!(error["code"], 6);
        assert_eq!(error["retryable"], false);
    }

    add_dune(&app, 1).await;
    let (status, error) = send(
        &app,
        Method::PUT,
        "/books/1",
        Some(ADMIN),
        Some(json!({ "title": "Dune", "copies": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "InvalidArgument");

    let (_, books) = send(&app, Method::GET, "/books", None, None).await;
    assert_eq!(books.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_malformed_ids_are_invalid_argument() {
    let app = app();
    send(&app, Method::POST, "/members", Some("0xm"), None).await;

    for (method, uri, caller) in [
        (Method::GET, "/books/abc", None),
        (Method::GET, "/books/-1/availability", None),
        (Method::POST, "/books/abc/borrow", Some("0xm")),
        (Method::POST, "/books/abc/return", Some("0xm")),
        (Method::GET, "/events?after=latest", None),
    ] {
        let (status, error) = send(&app, method, uri, caller, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(error["error"], "InvalidArgument", "{}", uri);
    }
}

#[tokio::test]
async fn test_update_cannot_shrink_below_loans() {
    let app = app();
    add_dune(&app, 2).await;
    send(&app, Method::POST, "/members", Some("0xm"), None).await;
    send(&app, Method::POST, "/books/1/borrow", Some("0xm"), None).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/books/1",
        Some(ADMIN),
        Some(json!({ "title": "Dune", "author": "Herbert", "copies": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, book) = send(
        &app,
        Method::PUT,
        "/books/1",
        Some(ADMIN),
        Some(json!({ "title": "Dune", "author": "Frank Herbert", "copies": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["author"], "Frank Herbert");
    assert_eq!(book["available_copies"], 3);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/books/7",
        Some(ADMIN),
        Some(json!({ "title": "Dune", "author": "Herbert", "copies": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_and_status() {
    let app = app();

    let (_, status_before) = send(&app, Method::GET, "/me", Some(ADMIN), None).await;
    assert_eq!(status_before["registered"], false);
    assert_eq!(status_before["admin"], true);

    let (status, body) = send(&app, Method::POST, "/members", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["member"]["address"], ADMIN);

    let (status, error) = send(&app, Method::POST, "/members", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "AlreadyRegistered");

    send(&app, Method::POST, "/members", Some("0xz"), None).await;
    let (_, members) = send(&app, Method::GET, "/members", None, None).await;
    assert_eq!(members, json!([
        { "address": ADMIN, "registered": true },
        { "address": "0xz", "registered": true },
    ]));
}

#[tokio::test]
async fn test_event_feed_and_summary() {
    let app = app();
    send(&app, Method::POST, "/members", Some("0xm"), None).await;
    add_dune(&app, 1).await;
    send(&app, Method::POST, "/books/1/borrow", Some("0xm"), None).await;
    send(&app, Method::POST, "/books/1/return", Some("0xm"), None).await;
    // Rejected requests leave no event
    send(&app, Method::POST, "/books/1/return", Some("0xm"), None).await;

    let (status, events) = send(&app, Method::GET, "/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = events
        .as_array()
        .expect("events array")
        .iter()
        .filter_map(|e| e["event"]["type"].as_str())
        .collect();
    assert_eq!(types, vec!["UserRegistered", "BookAdded", "BookBorrowed", "BookReturned"]);

    let (_, tail) = send(&app, Method::GET, "/events?after=2&limit=1", None, None).await;
    assert_eq!(tail[0]["id"], 3);
    assert_eq!(tail.as_array().map(Vec::len), Some(1));

    let (_, summary) = send(&app, Method::GET, "/ledger", None, None).await;
    assert_eq!(summary["admin"], ADMIN);
    assert_eq!(summary["book_id_counter"], 1);
    assert_eq!(summary["outstanding_borrowings"], 0);
    assert_eq!(summary["last_event_id"], 4);
}

#[tokio::test]
async fn test_event_stream_delivers_committed_events() {
    let app = app();
    let request = Request::builder()
        .uri("/api/v1/events/stream")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = app.clone().oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    add_dune(&app, 2).await;

    let mut frames = response.into_body().into_data_stream();
    let mut text = String::new();
    let read = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while !text.contains("\n\n") {
            let chunk = frames.next().await.expect("stream ended").expect("body error");
            text.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await;
    assert!(read.is_ok(), "no event within timeout: {:?}", text);

    let event_line = text.lines().find(|line| line.starts_with("event:")).expect("event line");
    assert_eq!(event_line.trim_start_matches("event:").trim(), "BookAdded");
    let data_line = text.lines().find(|line| line.starts_with("data:")).expect("data line");
    let record: Value =
        serde_json::from_str(data_line.trim_start_matches("data:").trim()).expect("data is JSON");
    assert_eq!(record["id"], 1);
    assert_eq!(record["event"]["title"], "Dune");
    assert_eq!(record["event"]["copies"], 2);
}

#[tokio::test]
async fn test_custom_identity_header() {
    let mut config = AppConfig::default();
    config.server.identity_header = "x-member".to_string();
    let app = app_with(config);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/members")
        .header("x-member", "0xm")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = app.clone().oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::CREATED);

    // The default header is no longer read
    let (status, _) = send(&app, Method::GET, "/me", Some("0xm"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let doc: Value = serde_json::from_slice(&bytes).expect("OpenAPI is JSON");
    let scheme = &doc["components"]["securitySchemes"]["caller_identity"];
    assert_eq!(scheme["in"], "header");
    assert_eq!(scheme["name"], "x-member");
}
