//! Pipeline Configuration
//!
//! Artifact locations and tuning, collected from `constants` once at startup.

use std::path::PathBuf;

use serde::Serialize;

use crate::constants;
use crate::logic::imputer::NumericStrategy;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
    pub features_path: PathBuf,
    pub db_path: PathBuf,
    pub table_name: String,
    pub numeric_strategy: NumericStrategy,
    pub unknown_token: String,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            model_path: constants::get_model_path(),
            encoders_path: constants::get_encoders_path(),
            features_path: constants::get_features_path(),
            db_path: constants::get_db_path(),
            table_name: constants::get_table_name(),
            numeric_strategy: NumericStrategy::Auto {
                skew_threshold: constants::get_skew_threshold(),
            },
            unknown_token: constants::get_unknown_token(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            encoders_path: PathBuf::from(constants::DEFAULT_ENCODERS_PATH),
            features_path: PathBuf::from(constants::DEFAULT_FEATURES_PATH),
            db_path: PathBuf::from(constants::DEFAULT_DB_PATH),
            table_name: constants::DEFAULT_TABLE_NAME.to_string(),
            numeric_strategy: NumericStrategy::default(),
            unknown_token: constants::DEFAULT_UNKNOWN_TOKEN.to_string(),
        }
    }
}
