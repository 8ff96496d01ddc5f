//! Shared application state

use std::sync::Arc;
use strandgate_auth::{AuthService, SecurityMode};
use strandgate_core::{EventLog, GatewayEvent, ModuleSet, SessionRegistry, StrandStore};

/// Everything the handlers and the gate share
pub struct AppState {
    pub auth: AuthService,
    pub mode: SecurityMode,
    /// Origin allow-list; empty means allow any
    pub allowed_origins: Vec<String>,
    pub strands: StrandStore,
    pub registry: SessionRegistry,
    pub event_log: Arc<EventLog>,
    pub modules: ModuleSet,
}

impl AppState {
    /// Record an auth rejection: log it, append a `security_event`, and
    /// let the watchdog decide whether to escalate. Never fails the
    /// request beyond the rejection itself.
    pub async fn note_auth_failure(&self, code: &str, agent: Option<&str>) {
        tracing::warn!(code, agent, "authentication rejected");
        self.event_log
            .record(&GatewayEvent::security_event(
                code,
                agent.unwrap_or("unknown"),
            ))
            .await;
        if let Some(incident) = self.modules.watchdog.observe_auth_failure(code, agent).await {
            self.event_log.record(&incident).await;
            self.registry.broadcast(&incident).await;
        }
    }
}
