//! Task runtime and HTTP server for one agent.
//!
//! An [`AgentServer`] pairs an agent card with a [`DefaultRequestHandler`] and
//! exposes them over axum:
//!
//! | route | purpose |
//! |-------|---------|
//! | `POST /` | JSON-RPC: `message/send`, `tasks/get`, `tasks/cancel` |
//! | `GET /.well-known/agent-card.json` | agent card (also at `/.well-known/agent.json`) |
//! | `GET /health` | liveness |

pub mod error_mapper;
pub mod event_queue;
pub mod executor;
pub mod request_handler;
pub mod status_mapper;
pub mod task_store;
pub mod task_updater;
pub mod web;

pub use event_queue::{EventQueue, EventReceiver, TaskEvent};
pub use executor::{AgentExecutor, RequestContext};
pub use request_handler::DefaultRequestHandler;
pub use task_store::{InMemoryTaskStore, TaskPatch, TaskStore};
pub use task_updater::TaskUpdater;

use std::sync::Arc;

use a2a_types::AgentCard;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerAddress;
use crate::errors::{AgentError, AgentResult};

/// Installs the global tracing subscriber. Filtering follows `RUST_LOG`.
///
/// Calling it again is harmless; the first subscriber stays.
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "agentdesk=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Serves one agent over HTTP.
pub struct AgentServer {
    card: AgentCard,
    handler: DefaultRequestHandler,
}

impl AgentServer {
    pub fn new(card: AgentCard, handler: DefaultRequestHandler) -> Self {
        Self { card, handler }
    }

    pub fn card(&self) -> &AgentCard {
        &self.card
    }

    pub fn router(&self) -> Router {
        let state = Arc::new(web::AppState {
            card: self.card.clone(),
            handler: self.handler.clone(),
        });

        Router::new()
            .route("/", post(web::json_rpc_handler))
            .route("/.well-known/agent-card.json", get(web::agent_card_handler))
            .route("/.well-known/agent.json", get(web::agent_card_handler))
            .route("/health", get(web::health_handler))
            .with_state(state)
    }

    /// Binds `address` and serves until ctrl-c.
    pub async fn serve(self, address: &ServerAddress) -> AgentResult<()> {
        init_tracing();

        let app = self
            .router()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let bind = format!("{}:{}", address.host, address.port);
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .map_err(|e| AgentError::ServerStartFailed(format!("{bind}: {e}")))?;

        let skills: Vec<&str> = self.card.skills.iter().map(|s| s.name.as_str()).collect();
        tracing::info!(
            agent = %self.card.name,
            address = %address,
            url = %self.card.url,
            skills = ?skills,
            "agent server listening"
        );

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AgentError::ServerStartFailed(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
