//! Health check handler

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Current server time
    pub time: DateTime<Utc>,
}

/// `GET /health` - liveness probe, public
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "strandgate".to_string(),
        time: Utc::now(),
    })
}
