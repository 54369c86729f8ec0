//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment.

use std::path::PathBuf;

/// Serialized classifier (ONNX)
pub const DEFAULT_MODEL_PATH: &str = "car_fault_classifier.onnx";

/// Persisted encoder vocabularies
pub const DEFAULT_ENCODERS_PATH: &str = "encoders.json";

/// Ordered feature list the classifier was trained on
pub const DEFAULT_FEATURES_PATH: &str = "feature_columns.json";

/// Prediction history database
pub const DEFAULT_DB_PATH: &str = "OBD_Predictions.db";

/// History table name
pub const DEFAULT_TABLE_NAME: &str = "fault_predictions";

/// |skewness| above which numeric columns are filled with the median
pub const DEFAULT_SKEW_THRESHOLD: f64 = 1.0;

/// Fill value for categorical columns with no observed values
pub const DEFAULT_UNKNOWN_TOKEN: &str = "Unknown";

/// Output field holding the fault category
pub const PREDICTED_FAULT_FIELD: &str = "Predicted_Fault";

/// Output field holding the advisory message
pub const PREDICTION_MESSAGE_FIELD: &str = "Prediction_Message";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Base directory for relative artifact paths, if configured
pub fn get_data_dir() -> Option<PathBuf> {
    std::env::var("FAULT_DATA_DIR").ok().map(PathBuf::from)
}

/// Resolve an artifact path against `FAULT_DATA_DIR` when it is relative
pub fn resolve_path(path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    match get_data_dir() {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    }
}

pub fn get_model_path() -> PathBuf {
    resolve_path(&env_or("FAULT_MODEL_PATH", DEFAULT_MODEL_PATH))
}

pub fn get_encoders_path() -> PathBuf {
    resolve_path(&env_or("FAULT_ENCODERS_PATH", DEFAULT_ENCODERS_PATH))
}

pub fn get_features_path() -> PathBuf {
    resolve_path(&env_or("FAULT_FEATURES_PATH", DEFAULT_FEATURES_PATH))
}

pub fn get_db_path() -> PathBuf {
    resolve_path(&env_or("FAULT_DB_PATH", DEFAULT_DB_PATH))
}

pub fn get_table_name() -> String {
    env_or("FAULT_TABLE_NAME", DEFAULT_TABLE_NAME)
}

pub fn get_skew_threshold() -> f64 {
    std::env::var("FAULT_SKEW_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SKEW_THRESHOLD)
}

pub fn get_unknown_token() -> String {
    env_or("FAULT_UNKNOWN_TOKEN", DEFAULT_UNKNOWN_TOKEN)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
