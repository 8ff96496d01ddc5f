//! Server configuration
//!
//! Environment-driven with CLI overrides applied in `main`. Defaults are
//! chosen so a dev-mode gateway runs with no configuration at all.

use std::net::SocketAddr;
use std::path::PathBuf;
use strandgate_auth::{JwtConfig, SecurityMode};
use strandgate_core::StrandLimits;

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Operating mode (SECURITY_MODE: strict|dev)
    pub mode: SecurityMode,
    /// Bind host
    pub host: String,
    /// HTTP API port (PORT_HTTP)
    pub port_http: u16,
    /// Websocket port (PORT_WS)
    pub port_ws: u16,
    /// Token signing configuration
    pub jwt: JwtConfig,
    /// Origin allow-list (ALLOWED_ORIGINS, comma-separated; empty = any)
    pub allowed_origins: Vec<String>,
    /// Raw agent credential entries (AGENT_API_KEYS)
    pub agent_keys: String,
    /// Event log sink (EVENT_LOG_PATH)
    pub event_log_path: PathBuf,
    /// Federation spool sink (FEDERATION_SPOOL_PATH)
    pub federation_spool_path: PathBuf,
    /// Requested optional modules (SECURITY_MODULES, comma-separated)
    pub security_modules: Vec<String>,
    /// Strand store capacity bounds
    pub strand_limits: StrandLimits,
    /// Seconds between replay-guard sweeps
    pub replay_sweep_secs: u64,
}

impl ServerConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = StrandLimits::default();
        Self {
            mode: env_var("SECURITY_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            host: env_var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port_http: env_parse("PORT_HTTP").unwrap_or(8080),
            port_ws: env_parse("PORT_WS").unwrap_or(8081),
            jwt: JwtConfig::from_env(),
            allowed_origins: env_list("ALLOWED_ORIGINS"),
            agent_keys: env_var("AGENT_API_KEYS").unwrap_or_default(),
            event_log_path: env_var("EVENT_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("events.log")),
            federation_spool_path: env_var("FEDERATION_SPOOL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("federation.spool")),
            security_modules: env_list("SECURITY_MODULES"),
            strand_limits: StrandLimits {
                max_codons_per_strand: env_parse("MAX_CODONS_PER_STRAND")
                    .unwrap_or(defaults.max_codons_per_strand),
                max_strands: env_parse("MAX_STRANDS").unwrap_or(defaults.max_strands),
            },
            replay_sweep_secs: env_parse("REPLAY_SWEEP_SECONDS").unwrap_or(30),
        }
    }

    pub fn http_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port_http).parse()
    }

    pub fn ws_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port_ws).parse()
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key).and_then(|v| v.trim().parse().ok())
}

fn env_list(key: &str) -> Vec<String> {
    env_var(key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
