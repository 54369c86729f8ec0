//! Pipeline status handler

use axum::{extract::State, Json};
use fault_core::logic::pipeline::PipelineStatus;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub environment: String,
    #[serde(flatten)]
    pub pipeline: PipelineStatus,
}

/// Model metadata, latency stats and artifact versions
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        pipeline: state.pipeline.status(),
    })
}
