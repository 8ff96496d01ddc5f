//! Token issuance handler

use crate::error::{ApiError, ApiResult};
use crate::extractors::Json;
use crate::state::AppState;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strandgate_auth::SecurityMode;

/// `POST /auth/token` request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// `POST /auth/token` response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Seconds until expiry
    pub expires_in: u64,
    pub jti: String,
    /// Operating mode the gateway is running in
    pub mode: SecurityMode,
}

/// Exchange agent credentials for a single-use bearer token. Public.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    match state
        .auth
        .issue_token(&body.agent_id, &body.api_key, body.role.as_deref())
    {
        Ok(issued) => {
            tracing::info!(agent_id = %body.agent_id, jti = %issued.jti, "token issued");
            Ok(Json(TokenResponse {
                token: issued.token,
                expires_in: issued.expires_in,
                jti: issued.jti,
                mode: state.mode,
            }))
        }
        Err(e) => {
            let api_err = ApiError::from(e);
            state
                .note_auth_failure(api_err.error_code(), Some(&body.agent_id))
                .await;
            Err(api_err)
        }
    }
}
