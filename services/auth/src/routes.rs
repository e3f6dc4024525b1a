//! Authentication service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{ErrorKind, ServiceError, database};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    AppState,
    models::{LoginCredentials, RefreshRequest, RegisterRequest, UserResponse},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh_token))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match database::health_check(&state.db_pool).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ok", "service": "auth-service"})),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "unavailable", "service": "auth-service"})),
        ),
    }
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload?;
    info!("Registration attempt for user: {}", payload.username);

    let user = state.auth_service.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload?;
    info!("Login attempt for user: {}", payload.username);

    let tokens = state.auth_service.login(&payload).await?;
    Ok((StatusCode::OK, Json(tokens)))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload?;
    info!("Token refresh request");

    let tokens = state.auth_service.refresh(&payload.refresh_token).await?;
    Ok((StatusCode::OK, Json(tokens)))
}

/// Error type for authentication endpoints
#[derive(Debug, Error)]
#[error(transparent)]
pub struct AuthError(#[from] ServiceError);

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::validation(rejection.body_text()))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        if kind == ErrorKind::Internal {
            error!("Request failed: {}", self.0);
        }

        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "error": self.0.public_message(),
        }));

        (status, body).into_response()
    }
}
