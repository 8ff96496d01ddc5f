//! Access gate
//!
//! One middleware wrapped around the whole HTTP router. Public paths
//! pass untouched; in dev mode everything passes. For protected paths in
//! strict mode the origin filter runs first, then bearer-token
//! verification consumes the token's jti. A verified identity lands in
//! the request extensions for handlers that want it.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Paths reachable without a bearer token
pub const PUBLIC_PATHS: &[&str] = &["/health", "/auth/token"];

pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return Ok(next.run(request).await);
    }
    if state.mode.is_dev() {
        return Ok(next.run(request).await);
    }

    // Origin filter first; a filtered request never reaches auth.
    if let Err(e) = check_origin(&state, &request) {
        state.note_auth_failure(e.error_code(), None).await;
        return Err(e);
    }

    let token = match bearer_token(&request) {
        Some(token) => token,
        None => {
            let e = ApiError::from(strandgate_auth::AuthError::MissingToken);
            state.note_auth_failure(e.error_code(), None).await;
            return Err(e);
        }
    };

    match state.auth.verify_bearer(&token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(e) => {
            let api_err = ApiError::from(e);
            state.note_auth_failure(api_err.error_code(), None).await;
            Err(api_err)
        }
    }
}

/// Admit requests with no Origin header, or whose Origin is listed. An
/// empty list is the explicit allow-any default.
fn check_origin(state: &AppState, request: &Request) -> Result<(), ApiError> {
    if state.allowed_origins.is_empty() {
        return Ok(());
    }
    let Some(origin) = request.headers().get(header::ORIGIN) else {
        return Ok(());
    };
    let origin = origin.to_str().map_err(|_| ApiError::OriginNotAllowed)?;
    if state.allowed_origins.iter().any(|allowed| allowed == origin) {
        Ok(())
    } else {
        Err(ApiError::OriginNotAllowed)
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
