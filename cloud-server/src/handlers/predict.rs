//! Prediction handler
//!
//! Accepts a multipart upload (`file` part, `.csv`), a raw CSV body, or JSON
//! records. Scoring is blocking work (ONNX, SQLite) and runs off the async
//! runtime.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    Json,
};
use fault_core::logic::pipeline::PredictionSummary;
use fault_core::{PipelineWarning, RawBatch};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub status: &'static str,
    pub batch_id: String,
    /// Input rows in upload order, with `Predicted_Fault` / `Prediction_Message`
    pub results: Vec<serde_json::Map<String, serde_json::Value>>,
    pub summary: PredictionSummary,
    pub warnings: Vec<PipelineWarning>,
}

pub async fn predict(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<PredictResponse>> {
    let batch = read_batch(request).await?;
    tracing::debug!("Received batch: {} rows, {} columns", batch.len(), batch.columns().len());

    let pipeline = state.pipeline.clone();
    let scored = tokio::task::spawn_blocking(move || pipeline.score(&batch)).await??;

    for warning in &scored.warnings {
        tracing::warn!("Batch {}: {}", scored.batch_id, warning);
    }

    Ok(Json(PredictResponse {
        status: "success",
        results: scored.rows(),
        batch_id: scored.batch_id,
        summary: scored.summary,
        warnings: scored.warnings,
    }))
}

async fn read_batch(request: Request) -> AppResult<RawBatch> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| upload_error(e.status(), e.body_text()))?;
        return read_multipart(multipart).await;
    }

    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| upload_error(e.status(), e.body_text()))?;

    if content_type.starts_with("application/json") {
        let records: Vec<serde_json::Value> = serde_json::from_slice(&body)
            .map_err(|e| AppError::ValidationError(format!("Expected an array of records: {}", e)))?;
        Ok(RawBatch::from_records(&records)?)
    } else {
        Ok(RawBatch::from_csv_reader(body.as_ref())?)
    }
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<RawBatch> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_ascii_lowercase();
        if !filename.ends_with(".csv") {
            return Err(AppError::ValidationError("File must be a CSV".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| upload_error(e.status(), e.body_text()))?;
        return Ok(RawBatch::from_csv_reader(data.as_ref())?);
    }

    Err(AppError::ValidationError("Missing 'file' field".to_string()))
}

fn upload_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::ValidationError(message)
    }
}
