//! ONNX Classifier - ONNX Runtime backend
//!
//! `Session::run` needs exclusive access, so the session lives behind a
//! mutex and concurrent batches take turns scoring.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use super::inference::{Classifier, FeatureView, InferenceError, ModelMetadata};
use crate::logic::artifact::{self, ArtifactError};

/// Output names that carry the predicted label, in order of preference
const LABEL_OUTPUTS: &[&str] = &["label", "output_label"];

pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
}

impl OnnxClassifier {
    /// Load the model artifact. `features` is the width it was trained on.
    pub fn load(model_path: &Path, features: usize) -> Result<Self, ArtifactError> {
        log::info!("Loading ONNX model from: {:?}", model_path);

        let model_bytes = artifact::read_bytes(model_path)?;
        let checksum = hex::encode(Sha256::digest(&model_bytes));

        let session = Session::builder()
            .map_err(|e| ArtifactError::Model(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactError::Model(format!("Failed to set optimization: {}", e)))?
            .commit_from_memory(&model_bytes)
            .map_err(|e| ArtifactError::Model(format!("Failed to load model: {}", e)))?;

        let output_name = LABEL_OUTPUTS
            .iter()
            .find_map(|wanted| session.outputs.iter().find(|o| o.name == *wanted))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| ArtifactError::Model("No output defined".to_string()))?;

        log::info!(
            "ONNX model loaded successfully (output: {}, sha256: {})",
            output_name,
            checksum
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata: ModelMetadata {
                model_path: model_path.display().to_string(),
                model_type: "onnx".to_string(),
                features,
                checksum: Some(checksum),
                loaded_at: chrono::Utc::now(),
            },
        })
    }
}

impl Classifier for OnnxClassifier {
    fn input_width(&self) -> Option<usize> {
        Some(self.metadata.features)
    }

    fn predict(&self, features: FeatureView<'_>) -> Result<Vec<i64>, InferenceError> {
        let rows = features.nrows();
        let input_array: Array2<f32> = features.to_owned();

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError::Output(format!("missing output '{}'", self.output_name)))?;

        if let Ok(labels) = output.try_extract_tensor::<i64>() {
            return Ok(labels.1.to_vec());
        }

        let scores = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Output(format!("Extract error: {}", e)))?;
        classes_from_scores(scores.1, rows)
    }

    fn metadata(&self) -> ModelMetadata {
        self.metadata.clone()
    }
}

/// Classes from a float output: one value per row (a label),
/// or one score per class per row (argmax).
pub fn classes_from_scores(data: &[f32], rows: usize) -> Result<Vec<i64>, InferenceError> {
    if rows == 0 {
        return Ok(Vec::new());
    }
    if let Some(v) = data.iter().find(|v| !v.is_finite()) {
        return Err(InferenceError::Output(format!("non-finite model output: {}", v)));
    }
    if data.len() == rows {
        return Ok(data.iter().map(|v| v.round() as i64).collect());
    }
    if data.is_empty() || data.len() % rows != 0 {
        return Err(InferenceError::Output(format!(
            "{} values cannot be split across {} rows",
            data.len(),
            rows
        )));
    }

    let classes = data.len() / rows;
    Ok(data
        .chunks(classes)
        .map(|scores| {
            scores
                .iter()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |best, (i, &s)| if s > best.1 { (i, s) } else { best })
                .0 as i64
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_as_labels() {
        assert_eq!(classes_from_scores(&[3.0, 0.0, 4.0], 3).unwrap(), vec![3, 0, 4]);
    }

    #[test]
    fn test_scores_as_probabilities() {
        let probs = [
            0.1, 0.1, 0.1, 0.6, 0.1, // row 0 → 3
            0.7, 0.1, 0.1, 0.05, 0.05, // row 1 → 0
        ];
        assert_eq!(classes_from_scores(&probs, 2).unwrap(), vec![3, 0]);
    }

    #[test]
    fn test_scores_uneven_length_rejected() {
        assert!(classes_from_scores(&[0.1, 0.2, 0.3], 2).is_err());
    }

    #[test]
    fn test_non_finite_outputs_rejected() {
        assert!(matches!(
            classes_from_scores(&[3.0, f32::NAN], 2),
            Err(InferenceError::Output(_))
        ));
        assert!(matches!(
            classes_from_scores(&[0.2, f32::INFINITY, 0.5, 0.5], 2),
            Err(InferenceError::Output(_))
        ));
    }

    #[test]
    fn test_missing_model_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxClassifier::load(&dir.path().join("model.onnx"), 4);
        assert!(matches!(result, Err(ArtifactError::NotFound(_))));
    }
}
