//! Authentication error types
//!
//! Every check in the auth layer is a terminal rejection. Errors carry a
//! coarse machine-readable code and never leak which internal check failed
//! beyond that code.

use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown agent or secret mismatch
    #[error("Invalid agent key")]
    InvalidAgentKey,

    /// No bearer token on a protected request
    #[error("Missing token")]
    MissingToken,

    /// Token is malformed, mis-signed, from the wrong issuer, or expired
    #[error("Invalid token")]
    InvalidToken,

    /// Token carries no jti claim
    #[error("Token has no jti claim")]
    MissingJti,

    /// The jti has already been consumed within its validity window
    #[error("Token replay detected")]
    ReplayDetected,

    /// Configuration error (startup only, never surfaced to clients)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAgentKey
            | Self::MissingToken
            | Self::InvalidToken
            | Self::MissingJti
            | Self::ReplayDetected => 401,
            Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get the wire error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAgentKey => "invalid_agent_key",
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::MissingJti => "missing_jti",
            Self::ReplayDetected => "replay_detected",
            Self::Config(_) | Self::Internal(_) => "internal_error",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        // Expiry, bad signature, wrong issuer and malformed input all
        // collapse to the same coarse code on the wire.
        tracing::debug!(error = %err, "token rejected");
        Self::InvalidToken
    }
}
