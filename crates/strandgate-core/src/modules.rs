//! Optional security modules
//!
//! Collaborators the gateway can run without. Each lives behind a trait
//! with a pass-through stand-in, and [`ModuleSet::resolve`] degrades to
//! the stand-in with a warning whenever a requested module is unknown or
//! cannot be constructed. Startup never fails, and no request path ever
//! errors, because an optional module is unavailable.

use crate::error::{CoreError, CoreResult};
use crate::event_log::EventLog;
use crate::events::GatewayEvent;
use crate::strand::CodonDraft;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const MODULE_INTRUSION_WATCHDOG: &str = "intrusion_watchdog";
pub const MODULE_CROSS_SESSION_VALIDATOR: &str = "cross_session_validator";
pub const MODULE_FEDERATION_SYNC: &str = "federation_sync";

/// Observes authentication failures and may escalate them
#[async_trait]
pub trait IntrusionWatchdog: Send + Sync {
    /// Called on every auth rejection. A returned event is broadcast as a
    /// `security_incident`.
    async fn observe_auth_failure(&self, code: &str, agent: Option<&str>) -> Option<GatewayEvent>;
}

/// Vets codons before they reach the strand store
#[async_trait]
pub trait CrossSessionValidator: Send + Sync {
    async fn vet(&self, draft: &CodonDraft) -> CoreResult<()>;
}

/// Mirrors accepted events towards a peer gateway
#[async_trait]
pub trait FederationSync: Send + Sync {
    async fn mirror(&self, event: &GatewayEvent);
}

// --- pass-through stand-ins -------------------------------------------------

pub struct NoopWatchdog;

#[async_trait]
impl IntrusionWatchdog for NoopWatchdog {
    async fn observe_auth_failure(&self, _code: &str, _agent: Option<&str>) -> Option<GatewayEvent> {
        None
    }
}

pub struct NoopValidator;

#[async_trait]
impl CrossSessionValidator for NoopValidator {
    async fn vet(&self, _draft: &CodonDraft) -> CoreResult<()> {
        Ok(())
    }
}

pub struct NoopFederation;

#[async_trait]
impl FederationSync for NoopFederation {
    async fn mirror(&self, _event: &GatewayEvent) {}
}

// --- concrete implementations -----------------------------------------------

/// Counts auth failures per agent and raises an incident every time the
/// count crosses a multiple of the threshold
pub struct ThresholdWatchdog {
    threshold: u32,
    failures: Arc<RwLock<HashMap<String, u32>>>,
}

impl ThresholdWatchdog {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            failures: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for ThresholdWatchdog {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl IntrusionWatchdog for ThresholdWatchdog {
    async fn observe_auth_failure(&self, code: &str, agent: Option<&str>) -> Option<GatewayEvent> {
        let key = agent.unwrap_or("unknown").to_string();
        let mut failures = self.failures.write().await;
        let count = failures.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count % self.threshold == 0 {
            tracing::warn!(agent = %key, count = *count, code, "repeated auth failures");
            Some(GatewayEvent::security_incident(
                "repeated_auth_failures",
                format!("{} rejections for {}", count, key),
            ))
        } else {
            None
        }
    }
}

/// Rejects codon content carrying control characters (newline and tab
/// excepted), which keeps one session's payload from corrupting frames
/// replayed into another
pub struct ControlCharValidator;

#[async_trait]
impl CrossSessionValidator for ControlCharValidator {
    async fn vet(&self, draft: &CodonDraft) -> CoreResult<()> {
        let offending = draft
            .content
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r');
        if offending {
            Err(CoreError::CodonRejected(
                "control characters in content".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Spools mirrored events into a local append-only file for a peer
/// gateway to collect
pub struct SpoolFederation {
    spool: EventLog,
}

impl SpoolFederation {
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            spool: EventLog::open(path).await?,
        })
    }
}

#[async_trait]
impl FederationSync for SpoolFederation {
    async fn mirror(&self, event: &GatewayEvent) {
        self.spool.record(event).await;
    }
}

// --- loader -----------------------------------------------------------------

/// The resolved set of optional modules, pass-through by default
pub struct ModuleSet {
    pub watchdog: Arc<dyn IntrusionWatchdog>,
    pub validator: Arc<dyn CrossSessionValidator>,
    pub federation: Arc<dyn FederationSync>,
}

impl Default for ModuleSet {
    fn default() -> Self {
        Self {
            watchdog: Arc::new(NoopWatchdog),
            validator: Arc::new(NoopValidator),
            federation: Arc::new(NoopFederation),
        }
    }
}

impl ModuleSet {
    /// Resolve requested module names to concrete implementations.
    ///
    /// Unknown names, and modules whose construction fails, degrade to
    /// the pass-through stand-in with a warning.
    pub async fn resolve(names: &[String], federation_spool: &Path) -> Self {
        let mut set = Self::default();
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            match name {
                MODULE_INTRUSION_WATCHDOG => {
                    set.watchdog = Arc::new(ThresholdWatchdog::default());
                    tracing::info!(module = name, "security module loaded");
                }
                MODULE_CROSS_SESSION_VALIDATOR => {
                    set.validator = Arc::new(ControlCharValidator);
                    tracing::info!(module = name, "security module loaded");
                }
                MODULE_FEDERATION_SYNC => match SpoolFederation::open(federation_spool).await {
                    Ok(federation) => {
                        set.federation = Arc::new(federation);
                        tracing::info!(module = name, "security module loaded");
                    }
                    Err(e) => {
                        tracing::warn!(
                            module = name,
                            error = %e,
                            "security module unavailable, continuing without it"
                        );
                    }
                },
                unknown => {
                    tracing::warn!(
                        module = unknown,
                        "unknown security module requested, continuing without it"
                    );
                }
            }
        }
        set
    }
}
