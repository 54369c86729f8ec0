//! Model Module - Fault classifier inference
//!
//! `inference` owns the engine and the `Classifier` seam,
//! `onnx` is the production backend.

pub mod inference;
pub mod onnx;

// Re-export common types
pub use inference::{
    Classifier, EngineStatus, FeatureView, InferenceEngine, InferenceError, ModelMetadata,
};
pub use onnx::OnnxClassifier;
