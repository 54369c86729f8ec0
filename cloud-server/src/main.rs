//! Fault Prediction Server
//!
//! HTTP front for the fault prediction pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    FAULT PREDICTION API                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────────────────────────────────┐ │
//! │  │  API      │   │  FaultPipeline (blocking pool)          │ │
//! │  │  Gateway  │──▶│  impute → encode → reconcile → infer    │ │
//! │  │  (Axum)   │   │  → label → history                      │ │
//! │  └───────────┘   └──────────────────┬──────────────────────┘ │
//! │                                     ▼                        │
//! │              ┌──────────────┐  ┌──────────────┐              │
//! │              │ ONNX model   │  │ SQLite       │              │
//! │              │ + artifacts  │  │ history      │              │
//! │              └──────────────┘  └──────────────┘              │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use fault_core::FaultPipeline;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    init_tracing(config.is_production());

    tracing::info!("Fault prediction server starting...");
    tracing::info!("Model: {}", config.pipeline.model_path.display());

    // Artifacts are loaded once; a missing model is a startup failure
    let pipeline = FaultPipeline::from_config(&config.pipeline)
        .context("Failed to load prediction artifacts")?;

    // Build application state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fault_server=debug,fault_core=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FaultPipeline>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::check))
        .route("/status", get(handlers::status::status))
        .route("/history", get(handlers::history::recent))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/", post(handlers::predict::predict))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
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
