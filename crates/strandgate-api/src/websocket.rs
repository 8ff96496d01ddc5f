//! Websocket endpoint
//!
//! `GET /ws?token=...&sessionId=...` - the token is verified at the
//! handshake with the same cryptographic checks as HTTP (signature,
//! issuer, expiry, jti presence) but the jti is not consumed, so a
//! client can open its socket and still spend the token on one HTTP
//! call. A failed handshake is rejected before the upgrade completes, so
//! no frame is ever delivered on it.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use strandgate_auth::AuthError;
use strandgate_core::{CoreError, GatewayEvent};
use tokio::sync::mpsc;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsQuery {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub session_id: String,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if query.session_id.trim().is_empty() {
        return ApiError::from(CoreError::MissingFields(vec!["sessionId"])).into_response();
    }

    if !state.mode.is_dev() {
        if query.token.is_empty() {
            state.note_auth_failure("missing_token", None).await;
            return ApiError::from(AuthError::MissingToken).into_response();
        }
        match state.auth.verify_handshake(&query.token) {
            Ok(identity) => {
                tracing::info!(
                    agent_id = %identity.agent_id,
                    session_id = %query.session_id,
                    "websocket handshake accepted"
                );
            }
            Err(e) => {
                let api_err = ApiError::from(e);
                state.note_auth_failure(api_err.error_code(), None).await;
                return api_err.into_response();
            }
        }
    }

    let session_id = query.session_id.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session_id: String) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection_id = state.registry.bind(&session_id, tx).await;

    // Greet before anything else can be dispatched to this connection.
    let hello = GatewayEvent::hello(session_id.clone());
    let accepted = match serde_json::to_string(&hello) {
        Ok(frame) => ws_tx.send(Message::Text(frame)).await.is_ok(),
        Err(_) => false,
    };

    if accepted {
        loop {
            tokio::select! {
                outbound = rx.recv() => match outbound {
                    Some(frame) => {
                        if ws_tx.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                inbound = ws_rx.next() => match inbound {
                    // Inbound frames carry no protocol; only close matters.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
            }
        }
    }

    state.registry.unbind(&session_id, connection_id).await;
    tracing::debug!(session_id = %session_id, "websocket connection closed");
}
