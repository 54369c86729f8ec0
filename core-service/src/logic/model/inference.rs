//! Inference Engine - Classifier wrapper
//!
//! Holds the one classifier loaded for the process lifetime and checks the
//! contract around it: input width must match the classifier, output must
//! have one class per row. Any failure rejects the whole batch.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureMatrix;

/// Borrowed feature matrix handed to classifiers
pub type FeatureView<'a> = ArrayView2<'a, f32>;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("feature width mismatch: classifier expects {expected}, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("classifier returned {actual} predictions for {expected} rows")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("inference failed: {0}")]
    Runtime(String),

    #[error("unreadable model output: {0}")]
    Output(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for scoring backends (ONNX, in-process rules, ...)
///
/// Implementations are shared across concurrent batches. A backend that is
/// not safe for concurrent calls must serialize access internally.
pub trait Classifier: Send + Sync {
    /// Feature width the classifier accepts, when known
    fn input_width(&self) -> Option<usize>;

    /// One class index per row, in row order
    fn predict(&self, features: FeatureView<'_>) -> Result<Vec<i64>, InferenceError>;

    fn metadata(&self) -> ModelMetadata;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub features: usize,
    /// SHA-256 of the artifact bytes (hex)
    pub checksum: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

/// Engine Status for status endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model: ModelMetadata,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
    pub failure_count: u64,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct InferenceEngine {
    classifier: Box<dyn Classifier>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    failure_count: AtomicU64,
}

impl InferenceEngine {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self {
            classifier,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    /// Score every row. All-or-nothing: no partial output on failure.
    pub fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<i64>, InferenceError> {
        let start_time = std::time::Instant::now();

        let result = self.predict_checked(matrix);

        match &result {
            Ok(_) => {
                self.latency_sum_us
                    .fetch_add(start_time.elapsed().as_micros() as u64, Ordering::Relaxed);
                self.inference_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failure_count.fetch_add(1, Ordering::Relaxed);
                log::error!("Inference rejected batch of {} rows: {}", matrix.rows(), e);
            }
        }

        result
    }

    fn predict_checked(&self, matrix: &FeatureMatrix) -> Result<Vec<i64>, InferenceError> {
        if let Some(expected) = self.classifier.input_width() {
            if expected != matrix.width() {
                return Err(InferenceError::WidthMismatch {
                    expected,
                    actual: matrix.width(),
                });
            }
        }

        let classes = self.classifier.predict(matrix.view())?;

        if classes.len() != matrix.rows() {
            return Err(InferenceError::RowCountMismatch {
                expected: matrix.rows(),
                actual: classes.len(),
            });
        }

        Ok(classes)
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model: self.classifier.metadata(),
            avg_latency_ms: avg,
            inference_count: count,
            failure_count: self.failure_count.load(Ordering::Relaxed),
        }
    }
}
