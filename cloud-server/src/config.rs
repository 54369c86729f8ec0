//! Configuration module

use std::env;

use fault_core::PipelineConfig;

/// Default upload limit (bytes)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,

    /// Environment (development, production)
    pub environment: String,

    /// Artifact locations and pipeline tuning
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            pipeline: PipelineConfig::from_env(),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
