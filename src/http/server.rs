//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the board and service-details handlers
//! - Mount the routes under the configured path prefix
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener and stop on the shutdown signal

use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::dispatch::{self, Dispatcher};
use crate::http::request::{MakeRequestUuid, RequestIdExt};
use crate::shapes::Shapes;
use crate::upstream::LiveBoards;

/// HTTP server for the LDBWS proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server answering from `upstream`.
    pub fn new(config: ProxyConfig, upstream: Arc<dyn LiveBoards>) -> Self {
        let dispatcher = Dispatcher::new(
            upstream,
            Arc::new(Shapes::new()),
            Duration::from_secs(config.timeouts.request_secs),
        );
        let router = Self::build_router(&config, dispatcher);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers wrap outward: the request ID is set before the trace span
    /// opens, and copied onto the response on the way out.
    fn build_router(config: &ProxyConfig, dispatcher: Dispatcher) -> Router {
        let api = Router::new()
            .route("/departure-board/{from}", get(dispatch::departure_board))
            .route("/departure-board/{from}/{to}", get(dispatch::departure_board_to))
            .route("/arrival-board/{to}", get(dispatch::arrival_board))
            .route("/arrival-board/{to}/{from}", get(dispatch::arrival_board_from))
            .route("/service-details/{*service_id}", get(dispatch::service_details))
            .with_state(dispatcher);

        let prefix = config.http.path_prefix.as_str();
        let router = if prefix.is_empty() {
            api
        } else {
            Router::new().nest(prefix, api)
        };

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request.headers().request_id(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.http.path_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
