//! REST API server for the coaching endpoints

pub mod error;
pub mod handlers;

pub use error::{ApiError, ErrorBody};

use crate::claude::{ClaudeClient, CompletionClient};
use crate::coaching::CoachingService;
use crate::config::AppConfig;
use crate::error::Result;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub type SharedService = Arc<CoachingService<Arc<dyn CompletionClient>>>;

/// State shared by every handler. The service holds no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub service: SharedService,
}

impl AppState {
    pub fn new(service: CoachingService<Arc<dyn CompletionClient>>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// State backed by the Anthropic API
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client: Arc<dyn CompletionClient> = Arc::new(ClaudeClient::from_config(config)?);
        Ok(Self::new(CoachingService::new(client, config)?))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route(
            "/api/extract-criteria",
            post(handlers::extract_criteria).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/assess-draft",
            post(handlers::assess_draft).fallback(handlers::method_not_allowed),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &AppConfig) -> Result<()> {
    if !config.has_api_key() {
        warn!("ANTHROPIC_API_KEY is not set; coaching endpoints will answer 503");
    }

    let app = create_router(AppState::from_config(config)?);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Writing Gym API listening on {} (model {})", addr, config.model);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
