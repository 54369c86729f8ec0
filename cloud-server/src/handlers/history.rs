//! Prediction history handlers

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppResult, AppState};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub batch_id: String,
    pub row_index: usize,
    pub recorded_at: DateTime<Utc>,
    /// Original fields plus `Predicted_Fault` / `Prediction_Message`
    pub row: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub total: u64,
    pub records: Vec<HistoryEntry>,
}

/// Most recent predictions, newest first
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let pipeline = state.pipeline.clone();

    let (total, stored) = tokio::task::spawn_blocking(move || {
        let history = pipeline.history();
        Ok::<_, fault_core::logic::history::StoreError>((history.count()?, history.recent(limit)?))
    })
    .await??;

    let records = stored
        .into_iter()
        .map(|s| HistoryEntry {
            id: s.id,
            row: s.record.to_output(),
            batch_id: s.record.batch_id,
            row_index: s.record.row_index,
            recorded_at: s.record.recorded_at,
        })
        .collect();

    Ok(Json(HistoryResponse { total, records }))
}
