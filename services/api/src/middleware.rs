//! Authentication middleware for bearer token validation

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{error::ApiError, state::AppState};

/// Resolve the caller and attach its `Identity` to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(str::to_owned);

    let identity = state
        .identity_resolver
        .resolve_header(header.as_deref())
        .await?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
