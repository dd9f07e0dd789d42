//! Web API authentication tests.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use serde_json::{json, Value};

use common::{bearer, create_test_server, register, StubFetcher};

#[tokio::test]
async fn test_register_success() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert!(body["access_token"].is_string());
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["token_source"], "password");
}

#[tokio::test]
async fn test_register_token_works_on_me() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    let body = register(&server, "alice", "alice@example.com", "password123").await;
    let token = body["access_token"].as_str().unwrap();

    let response = server
        .get("/auth/me")
        .add_header(AUTHORIZATION, HeaderValue::from_str(&bearer(token)).unwrap())
        .await;

    response.assert_status_ok();
    let me: Value = response.json();
    assert_eq!(me["username"], "alice");
    assert_eq!(me["email"], "alice@example.com");
    assert!(me["discord_id"].is_null());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    register(&server, "alice", "alice@example.com", "password123").await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "someone_else",
            "email": "alice@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    register(&server, "alice", "alice@example.com", "password123").await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "al",
            "email": "not-an-email",
            "password": "short"
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["username"].is_array());
    assert!(body["error"]["details"]["email"].is_array());
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn test_login_success() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    register(&server, "alice", "alice@example.com", "password123").await;

    let response = server
        .post("/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let token = body["access_token"].as_str().unwrap();

    let me = server
        .get("/auth/me")
        .add_header(AUTHORIZATION, HeaderValue::from_str(&bearer(token)).unwrap())
        .await;
    me.assert_status_ok();
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    register(&server, "alice", "alice@example.com", "password123").await;

    let response = server
        .post("/auth/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "wrong-password"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    let response = server
        .post("/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": "password123"
        }))
        .await;

    // Same status as a wrong password
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_token() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    let response = server.get("/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/auth/me")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer garbage"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_oauth_provider() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    let response = server.get("/auth/gitlab").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let (server, _db) = create_test_server(StubFetcher::new()).await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
