//! Gateway event frames
//!
//! Every frame pushed to a websocket client, and every record appended to
//! the event log, is one of these. The `type` tag is the wire
//! discriminator.

use crate::strand::Codon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events delivered to websocket clients and the append-only log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// Greeting sent once per accepted websocket connection
    #[serde(rename_all = "camelCase")]
    Hello {
        session_id: String,
        ts: DateTime<Utc>,
    },

    /// A codon was appended to the session's strand
    #[serde(rename_all = "camelCase")]
    NuggetUpdate { payload: Codon },

    /// Noteworthy but non-incident security observation
    #[serde(rename_all = "camelCase")]
    SecurityEvent {
        code: String,
        detail: String,
        ts: DateTime<Utc>,
    },

    /// Escalated finding from the intrusion watchdog
    #[serde(rename_all = "camelCase")]
    SecurityIncident {
        code: String,
        detail: String,
        ts: DateTime<Utc>,
    },
}

impl GatewayEvent {
    pub fn hello(session_id: impl Into<String>) -> Self {
        Self::Hello {
            session_id: session_id.into(),
            ts: Utc::now(),
        }
    }

    pub fn nugget_update(payload: Codon) -> Self {
        Self::NuggetUpdate { payload }
    }

    pub fn security_event(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SecurityEvent {
            code: code.into(),
            detail: detail.into(),
            ts: Utc::now(),
        }
    }

    pub fn security_incident(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SecurityIncident {
            code: code.into(),
            detail: detail.into(),
            ts: Utc::now(),
        }
    }

    /// Session this event is scoped to, when it has one
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Hello { session_id, .. } => Some(session_id),
            Self::NuggetUpdate { payload } => Some(&payload.session_id),
            Self::SecurityEvent { .. } | Self::SecurityIncident { .. } => None,
        }
    }
}
