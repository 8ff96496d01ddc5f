//! API error handling
//!
//! Every rejection leaving the gateway is `{"error": "<code>"}` with a
//! coarse machine-readable code and nothing else. Internal detail stays
//! in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use strandgate_auth::AuthError;
use strandgate_core::CoreError;
use thiserror::Error;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced at the HTTP boundary
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// Origin header not in the allow-list
    #[error("Origin not allowed")]
    OriginNotAllowed,

    /// Body failed to deserialize
    #[error("Invalid request body")]
    InvalidRequestBody,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            Self::Core(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Self::OriginNotAllowed => StatusCode::FORBIDDEN,
            Self::InvalidRequestBody => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.error_code(),
            Self::Core(e) => e.error_code(),
            Self::OriginNotAllowed => "origin_not_allowed",
            Self::InvalidRequestBody => "invalid_request_body",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "internal error");
        }
        (status, Json(json!({ "error": self.error_code() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_map_to_401() {
        let err = ApiError::from(AuthError::ReplayDetected);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_code(), "replay_detected");
    }

    #[test]
    fn test_missing_fields_maps_to_400() {
        let err = ApiError::from(CoreError::MissingFields(vec!["content"]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "missing_fields");
    }

    #[test]
    fn test_capacity_maps_to_409() {
        let err = ApiError::from(CoreError::StrandFull);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "strand_full");
    }

    #[test]
    fn test_origin_rejection_does_not_leak_the_list() {
        let err = ApiError::OriginNotAllowed;
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_code(), "origin_not_allowed");
    }
}
