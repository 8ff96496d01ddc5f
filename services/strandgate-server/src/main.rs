//! StrandGate gateway server
//!
//! Session-affine gateway between untrusted agents and per-session
//! strands. Runs two listeners sharing one state: the HTTP API on
//! `PORT_HTTP` and the websocket event stream on `PORT_WS`.
//!
//! # Usage
//!
//! ```bash
//! # Local development, no configuration
//! SECURITY_MODE=dev strandgate-server
//!
//! # Strict mode
//! JWT_SECRET=... AGENT_API_KEYS=agent-1:secret strandgate-server
//! ```

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strandgate_api::{create_router, create_ws_router, AppState};
use strandgate_auth::{AuthService, CredentialStore, SecurityMode};
use strandgate_core::{EventLog, ModuleSet, SessionRegistry, StrandStore};

use crate::config::ServerConfig;

/// StrandGate - secure session gateway
#[derive(Parser, Debug)]
#[command(name = "strandgate-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Operating mode (strict, dev)
    #[arg(long, env = "SECURITY_MODE")]
    mode: Option<SecurityMode>,

    /// Host to bind both listeners to
    #[arg(long)]
    host: Option<String>,

    /// HTTP API port
    #[arg(long, env = "PORT_HTTP")]
    port_http: Option<u16>,

    /// Websocket port
    #[arg(long, env = "PORT_WS")]
    port_ws: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut server_config = ServerConfig::from_env();
    if let Some(mode) = args.mode {
        server_config.mode = mode;
    }
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port_http {
        server_config.port_http = port;
    }
    if let Some(port) = args.port_ws {
        server_config.port_ws = port;
    }

    init_logging(&args.log_level, &args.log_format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = %server_config.mode,
        "Starting StrandGate gateway"
    );

    if server_config.mode.is_dev() {
        tracing::warn!(
            "SECURITY_MODE=dev: origin filtering and token verification are DISABLED; \
             never expose this instance"
        );
    }

    // Refuses a missing or weak JWT secret in strict mode.
    server_config
        .jwt
        .validate(server_config.mode)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let credentials = CredentialStore::parse(&server_config.agent_keys);
    if credentials.is_empty() && !server_config.mode.is_dev() {
        tracing::warn!("AGENT_API_KEYS is empty; no agent can obtain a token");
    }
    tracing::info!(agents = credentials.len(), "credential store loaded");

    let event_log = Arc::new(EventLog::open(&server_config.event_log_path).await?);
    tracing::info!(path = %server_config.event_log_path.display(), "event log open");

    let modules = ModuleSet::resolve(
        &server_config.security_modules,
        &server_config.federation_spool_path,
    )
    .await;

    let auth = AuthService::new(credentials, server_config.jwt.clone());
    let replay_guard = auth.replay_guard();

    let state = Arc::new(AppState {
        auth,
        mode: server_config.mode,
        allowed_origins: server_config.allowed_origins.clone(),
        strands: StrandStore::new(server_config.strand_limits),
        registry: SessionRegistry::new(),
        event_log,
        modules,
    });

    // Advisory cleanup of consumed jti entries whose token has expired.
    let sweep_interval = Duration::from_secs(server_config.replay_sweep_secs.max(1));
    let sweeper = tokio::spawn(replay_guard.run_sweeper(sweep_interval));

    let http_addr = server_config.http_addr()?;
    let ws_addr = server_config.ws_addr()?;
    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;
    let ws_listener = tokio::net::TcpListener::bind(ws_addr).await?;

    tracing::info!(http = %http_addr, ws = %ws_addr, "listening");

    let http_server = axum::serve(http_listener, create_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal("http"));
    let ws_server = axum::serve(ws_listener, create_ws_router(state))
        .with_graceful_shutdown(shutdown_signal("ws"));

    let (http_result, ws_result) = tokio::join!(http_server, ws_server);
    http_result?;
    ws_result?;

    sweeper.abort();
    tracing::info!("Gateway shutdown complete");
    Ok(())
}

fn init_logging(level: &str, format: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(env_filter);
    match format {
        "json" => subscriber.with(fmt::layer().json().with_target(true)).init(),
        _ => subscriber.with(fmt::layer().pretty().with_target(true)).init(),
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal(listener: &'static str) {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!(listener, "shutdown signal received");
}
