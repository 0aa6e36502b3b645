//! Nirabhi Guard Backend Server
//!
//! Relays user-submitted lines to an AI classifier for moderation triage
//! (ALLOW / FLAG / BLOCK with categories), then simulates what the
//! moderator's rule list would do with each verdict.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       NIRABHI GUARD                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────────┐  │
//! │  │  API      │──▶│  Classifier  │──▶│  Gemini API         │  │
//! │  │  (Axum)   │   │  (fan-out)   │   │  (one call / line)  │  │
//! │  └─────┬─────┘   └──────┬───────┘   └─────────────────────┘  │
//! │        │                ▼                                    │
//! │  ┌─────▼─────┐   ┌──────────────┐                            │
//! │  │ RuleStore │──▶│  Simulation  │                            │
//! │  │ (memory)  │   │              │                            │
//! │  └───────────┘   └──────────────┘                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod classifier;
mod simulation;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, delete},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classifier::{Classifier, GeminiClassifier};
use models::RuleStore;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_logging(&config);

    tracing::info!("Nirabhi Guard backend starting ({})...", config.environment);
    tracing::info!("Classifier model: {} via {}", config.model, config.api_base);
    if !config.has_api_key() {
        tracing::warn!("API_KEY is not configured; /api/analyze will fail until it is set");
    }

    let classifier = GeminiClassifier::from_config(&config)?;

    // Build application state
    let state = AppState {
        rules: RuleStore::new(),
        classifier: Arc::new(classifier),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &config::Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nirabhi_guard=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rules: RuleStore,
    pub classifier: Arc<dyn Classifier>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))

        // Rules
        .route("/api/rules", get(handlers::rules::list))
        .route("/api/rules", post(handlers::rules::create))
        .route("/api/rules/:id", delete(handlers::rules::delete))

        // Analysis
        .route("/api/analyze", post(handlers::analyze::analyze))

        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
