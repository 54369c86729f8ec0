//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use fault_core::PipelineError;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Upload errors
    ValidationError(String),
    PayloadTooLarge(String),

    // Pipeline errors
    InferenceError(String),
    HistoryError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.as_str()),
            AppError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str())
            }
            AppError::HistoryError(msg) => {
                tracing::error!("History error: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Prediction history unavailable")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Batch(e) => AppError::ValidationError(e.to_string()),
            PipelineError::Inference(e) => {
                AppError::InferenceError(format!("Prediction failed: {}", e))
            }
            PipelineError::Artifact(e) => AppError::InternalError(e.to_string()),
            PipelineError::Store(e) => AppError::HistoryError(e.to_string()),
        }
    }
}

impl From<fault_core::BatchError> for AppError {
    fn from(err: fault_core::BatchError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<fault_core::logic::history::StoreError> for AppError {
    fn from(err: fault_core::logic::history::StoreError) -> Self {
        AppError::HistoryError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}
