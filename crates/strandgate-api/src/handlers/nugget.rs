//! Codon creation handler

use crate::error::ApiResult;
use crate::extractors::Json;
use crate::state::AppState;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strandgate_core::{Codon, CodonDraft, CoreError, GatewayEvent};

/// `POST /nugget/create` response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NuggetResponse {
    pub status: String,
    pub payload: Codon,
}

/// Append a codon to its session's strand and fan the update out to the
/// session's live websocket connections. Protected.
pub async fn create_nugget(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<CodonDraft>,
) -> ApiResult<Json<NuggetResponse>> {
    state.modules.validator.vet(&draft).await?;

    let codon = state.strands.append(draft).await?;
    tracing::debug!(
        session_id = %codon.session_id,
        nugget_id = %codon.nugget_id,
        "codon appended"
    );

    let event = GatewayEvent::nugget_update(codon.clone());
    let delivered = state.registry.dispatch(&codon.session_id, &event).await;
    tracing::debug!(session_id = %codon.session_id, delivered, "nugget update dispatched");

    // Best-effort sinks; neither can fail the request.
    state.event_log.record(&event).await;
    state.modules.federation.mirror(&event).await;

    Ok(Json(NuggetResponse {
        status: "queued".to_string(),
        payload: codon,
    }))
}

/// `GET /nugget/list` query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub session_id: String,
}

/// `GET /nugget/list` response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrandResponse {
    pub session_id: String,
    pub count: usize,
    pub codons: Vec<Codon>,
}

/// Snapshot of a session's strand, insertion-ordered. A session that was
/// never written to is an empty strand, not an error. Protected.
pub async fn list_nuggets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<StrandResponse>> {
    if query.session_id.trim().is_empty() {
        return Err(CoreError::MissingFields(vec!["sessionId"]).into());
    }
    let codons = state.strands.strand(&query.session_id).await;
    Ok(Json(StrandResponse {
        session_id: query.session_id,
        count: codons.len(),
        codons,
    }))
}
