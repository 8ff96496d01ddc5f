//! StrandGate core
//!
//! Session-scoped state behind the gateway surface: the append-only
//! strand store, the websocket session registry with its broadcast
//! dispatcher, the append-only event log, and the optional security
//! modules with their pass-through stand-ins.

pub mod error;
pub mod event_log;
pub mod events;
pub mod modules;
pub mod registry;
pub mod strand;

pub use error::{CoreError, CoreResult};
pub use event_log::EventLog;
pub use events::GatewayEvent;
pub use modules::{
    CrossSessionValidator, FederationSync, IntrusionWatchdog, ModuleSet, NoopFederation,
    NoopValidator, NoopWatchdog,
};
pub use registry::{ConnectionId, SessionRegistry};
pub use strand::{Codon, CodonDraft, StrandLimits, StrandStore};
