//! History Module - Append-only prediction log
//!
//! Every scored row is written once, with the original fields and the
//! prediction attached. Rows are never updated or deleted.

pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{PREDICTED_FAULT_FIELD, PREDICTION_MESSAGE_FIELD};
use crate::logic::labels::PredictionResult;

pub use sqlite::SqliteResultStore;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot open result store at {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid table name '{0}'")]
    InvalidTable(String),
}

// ============================================================================
// RECORDS
// ============================================================================

/// One input row plus its prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub batch_id: String,
    /// Position of the row in its batch
    pub row_index: usize,
    /// Original fields, in upload order
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub prediction: PredictionResult,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Original fields followed by `Predicted_Fault` and `Prediction_Message`
    pub fn to_output(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut out = self.fields.clone();
        out.insert(
            PREDICTED_FAULT_FIELD.to_string(),
            serde_json::Value::String(self.prediction.fault_category.as_str().to_string()),
        );
        out.insert(
            PREDICTION_MESSAGE_FIELD.to_string(),
            serde_json::Value::String(self.prediction.advisory_message.clone()),
        );
        out
    }
}

/// A record as read back, with its insertion id
#[derive(Debug, Clone, Serialize)]
pub struct StoredPrediction {
    pub id: i64,
    #[serde(flatten)]
    pub record: HistoryRecord,
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Durable sink for scored rows
///
/// `append` writes each row atomically; rows of concurrent batches may
/// interleave in the store.
pub trait ResultStore: Send + Sync {
    /// Returns the number of rows written
    fn append(&self, records: &[HistoryRecord]) -> Result<usize, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;

    /// Newest first
    fn recent(&self, limit: usize) -> Result<Vec<StoredPrediction>, StoreError>;

    /// Human-readable location, for logs and status
    fn describe(&self) -> String;
}
