//! Fault Core - Vehicle fault prediction from OBD readings

pub mod constants;
pub mod logic;

pub use logic::batch::{BatchError, RawBatch};
pub use logic::config::PipelineConfig;
pub use logic::labels::{FaultCategory, PredictionResult};
pub use logic::pipeline::{FaultPipeline, PipelineError, PipelineWarning, ScoredBatch};
