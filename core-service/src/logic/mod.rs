//! Logic Module - Fault prediction pipeline
//!
//! ## Stages
//! - `batch/` - Uploaded rows (CSV / JSON records)
//! - `imputer/` - Missing value repair
//! - `encoder/` - Categorical vocabularies (persisted, grow-only)
//! - `features/` - Expected feature list and schema reconciliation
//! - `model/` - Classifier inference (ONNX)
//! - `labels` - Class index → fault category
//! - `history/` - Append-only prediction log
//! - `pipeline/` - Runs the stages for one batch

pub mod artifact;
pub mod batch;
pub mod config;
pub mod encoder;
pub mod features;
pub mod history;
pub mod imputer;
pub mod labels;
pub mod model;
pub mod pipeline;
