//! HTTP API served with axum.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api/health
//! GET  /api/generate              service info
//! POST /api/generate              run the website pipeline
//! POST /api/generate/code         one enhanced-prompt code generation
//! POST /api/generate/content      copy for one website section
//! GET  /api/chains[?category=]    prompt-chain catalog
//! GET  /api/chains/{id}
//! POST /api/chains/{id}/run
//! GET  /api/templates[?category=&q=]
//! GET  /api/templates/{id}
//! ```
//!
//! Every route that calls a provider reserves one credit up front and keeps
//! it only when the call succeeds.
//!
//! The server loop stops when the supplied [`CancellationToken`] fires;
//! in-flight requests are allowed to finish.

mod api;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::ai::{AiService, ModelChoice};
use crate::config::Config;
use crate::credits::CreditLedger;
use crate::error::AppError;

pub const API_VERSION: &str = "1.0.0";

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: the ledger is shared and providers share HTTP clients.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: AiService,
    pub credits: Arc<CreditLedger>,
    /// Used when a request names no model.
    pub default_model: ModelChoice,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: AiService, credits: CreditLedger, default_model: ModelChoice) -> Self {
        Self {
            service,
            credits: Arc::new(credits),
            default_model,
            request_timeout: Duration::from_secs(600),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let service = AiService::from_config(config)?;
        Ok(Self::new(service, CreditLedger::from_config(&config.credits), config.llm.default_model)
            .with_request_timeout(Duration::from_secs(config.server.request_timeout_seconds)))
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn run(bind_addr: &str, state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, models = ?state.service.available_models(), "API server listening");
    serve(listener, state, shutdown).await
}

/// Serve on an already-bound listener.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("API server shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health",           get(api::health))
        .route("/api/generate",         get(api::generate_info).post(api::generate))
        .route("/api/generate/code",    post(api::generate_code))
        .route("/api/generate/content", post(api::generate_content))
        .route("/api/chains",           get(api::chains))
        .route("/api/chains/{id}",      get(api::chain_detail))
        .route("/api/chains/{id}/run",  post(api::run_chain))
        .route("/api/templates",        get(api::templates))
        .route("/api/templates/{id}",   get(api::template_detail))
        .with_state(state)
}
