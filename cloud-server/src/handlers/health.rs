//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    features: usize,
    encoder_version: u64,
}

/// Readiness message
pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "API ready to receive data and analyze faults"
    }))
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        features: state.pipeline.schema().len(),
        encoder_version: state.pipeline.encoder().version(),
    })
}
