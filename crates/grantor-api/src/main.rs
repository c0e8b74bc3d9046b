//! Grantor Server Binary
//!
//! Permissions management service: group CRUD, user and group permission
//! grants, and transitive resolution of effective permissions.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! grantor --config config.yaml
//!
//! # With environment variables only
//! GRANTOR_SERVER__PORT=9090 grantor
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{info, Level};

use grantor_api::config::ServerConfig;
use grantor_api::http::{create_router_with_body_limit, AppState};
use grantor_api::observability::{init_logging, LoggingConfig};
use grantor_api::service::{AccessPolicy, AuthorizationService};
use grantor_domain::resolver::ResolverConfig;
use grantor_storage::MemoryAuthStore;

/// Grantor - Permissions Management Service
#[derive(Parser, Debug)]
#[command(name = "grantor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = if let Some(config_path) = args.config {
        ServerConfig::load(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    let log_config = LoggingConfig {
        json_format: config.logging.json,
        default_level: parse_log_level(&config.logging.level),
        include_spans: false,
    };
    init_logging(log_config);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting grantor server");

    // "memory" is the only backend; validate() already rejected others.
    info!("Using in-memory storage backend");
    let storage = Arc::new(MemoryAuthStore::new());

    let policy = AccessPolicy::new(config.authorization.superusers.clone());
    let resolver_config = ResolverConfig::default().with_max_visited(config.resolver.max_visited);
    let service = Arc::new(AuthorizationService::with_policy_and_resolver_config(
        storage,
        policy,
        resolver_config,
    ));

    let state = AppState { service };
    let router = create_router_with_body_limit(state, config.server.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

/// Parse log level from string.
fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
