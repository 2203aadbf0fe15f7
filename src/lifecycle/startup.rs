//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the access token
//! - Initialize subsystems in dependency order (metrics, upstream client)
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)
//! - Logging is initialized by the caller, before config errors can occur

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{resolve_access_token, ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::upstream::{SoapClient, UpstreamError};

/// Fatal errors during startup or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create upstream client: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the proxy until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());
    serve(config, shutdown).await
}

/// Run the proxy until `shutdown` is triggered.
pub async fn serve(config: ProxyConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let access_token = resolve_access_token(&config.upstream)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let upstream = Arc::new(SoapClient::new(&config.upstream, access_token)?);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        prefix = %config.http.path_prefix,
        upstream = %upstream.endpoint(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, upstream);
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
