//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Build the shared download client and page counter
//! - Serve on a bound listener until shutdown is signalled

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::document::{OfficePageCounter, PageCounter};
use crate::fetch::Downloader;
use crate::http::handlers;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::shutdown::signalled;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub downloader: Arc<Downloader>,
    pub counter: Arc<dyn PageCounter>,
}

/// Error type for server construction.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build download client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the page counting API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the default OOXML counter.
    pub fn new(config: ServiceConfig) -> Result<Self, ServerError> {
        let counter = OfficePageCounter::new(config.security.max_part_size);
        Self::with_counter(config, Arc::new(counter))
    }

    /// Create a new HTTP server with a custom page counter.
    pub fn with_counter(config: ServiceConfig, counter: Arc<dyn PageCounter>) -> Result<Self, ServerError> {
        let downloader = Arc::new(Downloader::new(&config.download)?);

        let state = AppState { downloader, counter };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Body limit and timeout failures go through the handlers' error
    /// envelope rather than plain-text middleware responses.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/health", get(handlers::health))
            .route("/api/count-pages", post(handlers::count_pages))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(HandleErrorLayer::new(handlers::middleware_error))
                    .timeout(Duration::from_secs(config.timeouts.request_secs)),
            )
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            download_timeout_secs = self.config.download.timeout_secs,
            max_download_bytes = self.config.download.max_bytes,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                signalled(shutdown).await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
