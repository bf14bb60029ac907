//! Node service for distributed mode
//!
//! This module implements the HTTP service that runs on each peer node.
//! The node service:
//! - Serves `POST /v1/grep` by running the match engine on the request's lines
//!   (or on its local data file when the request carries none)
//! - Serves `GET /health`
//! - Logs every request with method, path, status and latency
//! - Shuts down gracefully on SIGINT/SIGTERM
//!
//! Logical failures (bad pattern, missing data) are reported inside a `200`
//! response so the coordinator can tell them apart from transport problems.

use crate::config::ServeConfig;
use crate::distributed::protocol::{MatchRequest, MatchResponse, API_PATH_GREP, API_PATH_HEALTH, HEALTH_BODY};
use crate::grep::{self, DEFAULT_WORKERS};
use crate::input;
use crate::Result;
use anyhow::Context;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

/// Message returned when a request has no lines and the node has no data file
pub const NO_DATA_ERROR: &str = "no data (lines empty and no local file)";

/// Per-node state shared by all handlers
#[derive(Debug, Clone)]
pub struct NodeState {
    pub node_id: String,
    pub workers: usize,
    pub data_file: Option<PathBuf>,
}

impl From<&ServeConfig> for NodeState {
    fn from(config: &ServeConfig) -> Self {
        Self {
            node_id: config.node_id.clone(),
            workers: config.workers,
            data_file: config.data_file.clone(),
        }
    }
}

impl NodeState {
    /// Worker count for a request: request value, then node default, then engine default
    pub fn resolve_workers(&self, requested: usize) -> usize {
        if requested > 0 {
            requested
        } else if self.workers > 0 {
            self.workers
        } else {
            DEFAULT_WORKERS
        }
    }

    /// Execute one match request
    ///
    /// Never fails: every problem is reported through `MatchResponse::error`.
    pub async fn execute(&self, request: MatchRequest) -> MatchResponse {
        let MatchRequest {
            job_id,
            pattern,
            flags,
            lines,
            workers,
        } = request;

        let lines = if !lines.is_empty() {
            lines
        } else if let Some(path) = self.data_file.clone() {
            let loaded = tokio::task::spawn_blocking(move || input::read_lines_from_file(&path))
                .await
                .context("Data file reader panicked")
                .and_then(|r| r);
            match loaded {
                Ok(lines) => lines,
                Err(e) => {
                    let message = format!("{:#}", e);
                    tracing::warn!(job_id = %job_id, error = %message, "failed to load local data");
                    return MatchResponse::failure(job_id, &self.node_id, message);
                }
            }
        } else {
            return MatchResponse::failure(job_id, &self.node_id, NO_DATA_ERROR);
        };

        let workers = self.resolve_workers(workers);
        match grep::run(&pattern, &flags, lines, workers).await {
            Ok(output) => {
                tracing::debug!(job_id = %job_id, count = output.count, "job complete");
                MatchResponse::success(job_id, &self.node_id, output.matches, output.count)
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "job failed");
                MatchResponse::failure(job_id, &self.node_id, e.to_string())
            }
        }
    }
}

/// Node service
///
/// Runs on each peer node, accepting match requests from coordinators.
pub struct NodeService {
    config: ServeConfig,
}

impl NodeService {
    /// Create a new node service
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    /// HTTP routes of the service
    pub fn router(&self) -> Router {
        let state = Arc::new(NodeState::from(&self.config));
        Router::new()
            .route(API_PATH_HEALTH, get(handle_health))
            .route(API_PATH_GREP, post(handle_grep))
            .layer(Extension(state))
            .layer(middleware::from_fn(log_requests))
    }

    /// Bind the configured address and serve until SIGINT/SIGTERM
    pub async fn run(self) -> Result<()> {
        let bind_addr = listen_addr(&self.config.addr);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind node service on {}", bind_addr))?;

        println!(
            "distgrep server {} listening on {} (node={})",
            env!("CARGO_PKG_VERSION"),
            self.config.addr,
            self.config.node_id
        );

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            node = %self.config.node_id,
            workers = self.config.workers,
            data_file = ?self.config.data_file,
            "node service started"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .context("Node service failed")?;

        tracing::info!(node = %self.config.node_id, "node service stopped");
        Ok(())
    }
}

/// Turn a Go-style listen address (`:8080`) into a bindable one
pub fn listen_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

async fn handle_health() -> &'static str {
    HEALTH_BODY
}

async fn handle_grep(
    Extension(state): Extension<Arc<NodeState>>,
    Json(request): Json<MatchRequest>,
) -> Json<MatchResponse> {
    Json(state.execute(request).await)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed = ?start.elapsed(),
        "request"
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
