/// Request rejection tests that need no database
///
/// The router is built over a lazy pool that is never connected. Every
/// request here must be answered by the auth layer, the filter parser, or
/// body validation before any query runs.

#[allow(dead_code)]
mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{lazy_app, send, token_for, TEST_SECRET};
use serde_json::json;
use taskboard_shared::auth::jwt::{create_token, Claims};
use tower::Service as _;

#[tokio::test]
async fn test_welcome_is_public() {
    let app = lazy_app();

    let (status, body) = send(&app, "GET", "/api/welcome", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Welcome to Taskboard");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = lazy_app();

    for (method, uri) in [
        ("GET", "/api/tasks"),
        ("GET", "/api/tasks/1"),
        ("DELETE", "/api/tasks/1"),
        ("GET", "/api/statuses"),
        ("DELETE", "/api/labels/1"),
        ("GET", "/api/users/1"),
        ("PUT", "/api/users/1"),
    ] {
        let (status, body) = send(&app, method, uri, None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "unauthorized", "{method} {uri}");
    }
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let app = lazy_app();
    let token = token_for("a@x.com");

    for header in [format!("Basic {token}"), token.clone(), "Bearer".to_string()] {
        let request = axum::http::Request::builder()
            .uri("/api/tasks")
            .header("authorization", header.clone())
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{header:?}");
    }
}

#[tokio::test]
async fn test_expired_and_foreign_tokens_are_rejected() {
    let app = lazy_app();

    let expired = create_token(&Claims::new("a@x.com", Duration::hours(-2)), TEST_SECRET).unwrap();
    let (status, body) = send(&app, "GET", "/api/tasks", Some(expired.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");

    let foreign = create_token(
        &Claims::new("a@x.com", Duration::hours(1)),
        "a-completely-different-secret-of-32-bytes",
    )
    .unwrap();
    let (status, _) = send(&app, "GET", "/api/tasks", Some(foreign.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_filters_are_bad_requests() {
    let app = lazy_app();
    let token = token_for("a@x.com");

    for query in [
        "taskStatus=abc",
        "executorId=1.5",
        "authorId=",
        "labels=%5B1%2C",
        "labels=bug",
        "taskStatus=1&executorId=x",
    ] {
        let uri = format!("/api/tasks?{query}");
        let (status, body) = send(&app, "GET", &uri, Some(token.as_str()), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(body["error"], "bad_request", "{query}");
    }
}

#[tokio::test]
async fn test_filter_error_names_the_parameter() {
    let app = lazy_app();
    let token = token_for("a@x.com");

    let (_, body) = send(&app, "GET", "/api/tasks?executorId=abc", Some(token.as_str()), None).await;

    assert!(body["message"].as_str().unwrap().contains("executorId"));
}

#[tokio::test]
async fn test_invalid_bodies_are_unprocessable() {
    let app = lazy_app();
    let token = token_for("a@x.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/statuses",
        Some(token.as_str()),
        Some(json!({ "name": "ab" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "name");

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(token.as_str()),
        Some(json!({ "name": "   ", "taskStatusId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_undeserializable_bodies_use_the_error_shape() {
    let app = lazy_app();
    let token = token_for("a@x.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(token.as_str()),
        Some(json!({ "name": "Task without status" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "taskStatusId");

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(token.as_str()),
        Some(json!({ "name": "Typed task", "taskStatusId": 1, "executorId": "me" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "executorId");

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": "a@x.com", "firstName": "Ada", "lastName": "Lovelace" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "password");

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"email\": "))
        .unwrap();
    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_registration_reports_every_invalid_field() {
    let app = lazy_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "email": "nope",
            "firstName": "",
            "lastName": "  ",
            "password": "12"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "firstName", "lastName", "password"]);
}

#[tokio::test]
async fn test_login_validation() {
    let app = lazy_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "not-an-email", "password": "x" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = lazy_app();

    let (status, _) = send(&app, "GET", "/api/nothing-here", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
