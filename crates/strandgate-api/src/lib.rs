//! StrandGate gateway surface
//!
//! Session-affine gateway between untrusted agents and per-session
//! strands of immutable codons.
//!
//! ```text
//! /health          - liveness, public
//! /auth/token      - credential exchange for single-use bearer tokens, public
//! /nugget/create   - append a codon, protected by the access gate
//! /nugget/list     - read back a session's strand, protected
//! /ws              - session-bound event stream (separate listener)
//! ```

pub mod error;
pub mod extractors;
pub mod gate;
pub mod handlers;
pub mod state;
pub mod websocket;

use axum::http::{HeaderName, HeaderValue};
use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult};
pub use gate::PUBLIC_PATHS;
pub use state::AppState;

/// Create the HTTP API router with the access gate and the ambient
/// middleware stack
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/auth/token", post(handlers::token::issue_token))
        .route("/nugget/create", post(handlers::nugget::create_nugget))
        .route("/nugget/list", get(handlers::nugget::list_nuggets))
        .layer(middleware::from_fn_with_state(state.clone(), gate::access_gate))
        .with_state(state.clone());

    add_common_layers(router, &state.allowed_origins)
}

/// Create the websocket router served on its own listener
pub fn create_ws_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/ws", get(websocket::ws_handler))
        .with_state(state.clone());

    add_common_layers(router, &state.allowed_origins)
}

fn add_common_layers(router: Router, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let x_request_id = HeaderName::from_static("x-request-id");
    router
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(cors)
}
