//! HTTP-level tests for the `/api/auth/*` surface

use auth::{AppState, JwtConfig, JwtService, routes::create_router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use common::database::{DatabaseConfig, connect};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let pool = connect(&DatabaseConfig::in_memory()).await.unwrap();
    let jwt = JwtService::new(JwtConfig {
        secret: "routes-test-secret-routes-test-secret".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 3600,
    });
    create_router(AppState::new(pool, jwt))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn registration(username: &str) -> Value {
    json!({
        "username": username,
        "password": "s3cret",
        "confirmPassword": "s3cret",
        "firstName": "Alice",
        "lastName": "Smith"
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_login_refresh_flow() {
    let app = app().await;

    let (status, body) = post(&app, "/api/auth/register", registration("alice")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["firstName"], "Alice");
    assert!(body.get("passwordHash").is_none());

    let (status, body) = post(&app, "/api/auth/register", registration("alice")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");

    let (status, tokens) = post(
        &app,
        "/api/auth/login",
        json!({"username": "alice", "password": "s3cret"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tokens["tokenType"], "Bearer");
    assert_eq!(tokens["expiresIn"], 900);

    let (status, refreshed) = post(
        &app,
        "/api/auth/refresh",
        json!({"refreshToken": tokens["refreshToken"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(refreshed["accessToken"].is_string());

    let (status, _) = post(
        &app,
        "/api/auth/refresh",
        json!({"refreshToken": tokens["accessToken"]}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = app().await;
    post(&app, "/api/auth/register", registration("alice")).await;

    let (status, body) = post(
        &app,
        "/api/auth/login",
        json!({"username": "alice", "password": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn mismatched_confirmation_is_a_validation_error() {
    let app = app().await;
    let (status, body) = post(
        &app,
        "/api/auth/register",
        json!({"username": "alice", "password": "a", "confirmPassword": "b"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords do not match");
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
