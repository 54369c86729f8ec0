//! Fault Pipeline - Batch orchestration
//!
//! raw rows → impute → encode → reconcile → infer → label → history
//!
//! One call scores one batch, all-or-nothing: input-shape and inference
//! errors reject the whole batch. Persistence problems (history table,
//! vocabulary write-back) never do; they come back as warnings next to the
//! predictions.

mod summary;

use chrono::Utc;
use serde::Serialize;

pub use summary::{CategoryShare, PredictionSummary};

use crate::logic::artifact::ArtifactError;
use crate::logic::batch::{BatchError, RawBatch};
use crate::logic::config::PipelineConfig;
use crate::logic::encoder::{EncoderStore, LearnedCategory};
use crate::logic::features::{reconcile, FeatureSchema, LayoutInfo, ReconcileReport};
use crate::logic::history::{HistoryRecord, ResultStore, SqliteResultStore, StoreError};
use crate::logic::imputer::{ImputationReport, Imputer, NumericStrategy};
use crate::logic::labels::map_classes;
use crate::logic::model::{
    Classifier, EngineStatus, InferenceEngine, InferenceError, OnnxClassifier,
};

// ============================================================================
// ERRORS & WARNINGS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Only raised while building the pipeline
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Non-fatal problems attached to a scored batch
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum PipelineWarning {
    #[error("predictions were not saved to history: {0}")]
    Persistence(String),

    #[error("new categories were not saved: {0}")]
    VocabularyPersistence(String),
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ScoredBatch {
    pub batch_id: String,
    /// Same order as the input rows
    pub records: Vec<HistoryRecord>,
    pub summary: PredictionSummary,
    pub warnings: Vec<PipelineWarning>,
    pub imputation: ImputationReport,
    pub reconciliation: ReconcileReport,
    pub learned: Vec<LearnedCategory>,
    pub encoder_version: u64,
}

impl ScoredBatch {
    /// Output rows: original fields, then `Predicted_Fault` and `Prediction_Message`
    pub fn rows(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.records.iter().map(HistoryRecord::to_output).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Pipeline status for status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub engine: EngineStatus,
    pub layout: LayoutInfo,
    pub encoder_version: u64,
    pub encoded_columns: Vec<String>,
    pub history: String,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct FaultPipeline {
    numeric_strategy: NumericStrategy,
    unknown_token: String,
    encoder: EncoderStore,
    schema: FeatureSchema,
    engine: InferenceEngine,
    store: Box<dyn ResultStore>,
}

impl FaultPipeline {
    pub fn new(
        encoder: EncoderStore,
        schema: FeatureSchema,
        classifier: Box<dyn Classifier>,
        store: Box<dyn ResultStore>,
    ) -> Self {
        Self {
            numeric_strategy: NumericStrategy::default(),
            unknown_token: crate::constants::DEFAULT_UNKNOWN_TOKEN.to_string(),
            encoder,
            schema,
            engine: InferenceEngine::new(classifier),
            store,
        }
    }

    pub fn with_numeric_strategy(mut self, strategy: NumericStrategy) -> Self {
        self.numeric_strategy = strategy;
        self
    }

    pub fn with_unknown_token(mut self, token: impl Into<String>) -> Self {
        self.unknown_token = token.into();
        self
    }

    /// Load every artifact. Any failure here is a startup error.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let schema = FeatureSchema::load(&config.features_path)?;
        let encoder = EncoderStore::load(&config.encoders_path)?;
        let classifier = OnnxClassifier::load(&config.model_path, schema.len())?;
        let store = SqliteResultStore::new(&config.db_path, &config.table_name)?;

        log::info!(
            "Fault pipeline ready: {} features (layout {:08x}), history at {}",
            schema.len(),
            schema.layout_hash(),
            store.describe()
        );

        Ok(Self::new(encoder, schema, Box::new(classifier), Box::new(store))
            .with_numeric_strategy(config.numeric_strategy)
            .with_unknown_token(config.unknown_token.clone()))
    }

    /// Score one batch. Output rows line up 1:1 with input rows.
    pub fn score(&self, batch: &RawBatch) -> Result<ScoredBatch, PipelineError> {
        if batch.is_empty() {
            return Err(BatchError::Empty.into());
        }
        log::info!("Processing batch of {} rows", batch.len());

        let mut warnings = Vec::new();

        let imputer = Imputer::new(self.numeric_strategy)
            .with_unknown_token(self.unknown_token.clone())
            .with_categorical_columns(self.encoder.known_columns());
        let (frame, imputation) = imputer.impute(batch);

        let encoded = self.encoder.encode(frame);
        if let Some(e) = encoded.persist_error {
            warnings.push(PipelineWarning::VocabularyPersistence(e));
        }

        let (matrix, reconciliation) = reconcile(&encoded.frame, &self.schema);

        let classes = self.engine.predict(&matrix)?;
        let predictions = map_classes(&classes);

        let batch_id = uuid::Uuid::new_v4().to_string();
        let recorded_at = Utc::now();
        let records: Vec<HistoryRecord> = predictions
            .into_iter()
            .enumerate()
            .map(|(row_index, prediction)| HistoryRecord {
                batch_id: batch_id.clone(),
                row_index,
                fields: batch.row_record(row_index).unwrap_or_default(),
                prediction,
                recorded_at,
            })
            .collect();

        match self.store.append(&records) {
            Ok(written) => log::info!("Saved {} predictions to {}", written, self.store.describe()),
            Err(e) => {
                log::warn!("Failed to save predictions to {}: {}", self.store.describe(), e);
                warnings.push(PipelineWarning::Persistence(e.to_string()));
            }
        }

        let summary = PredictionSummary::from_records(&records);
        summary.log();

        Ok(ScoredBatch {
            batch_id,
            records,
            summary,
            warnings,
            imputation,
            reconciliation,
            learned: encoded.learned,
            encoder_version: encoded.state_version,
        })
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            engine: self.engine.status(),
            layout: self.schema.info(),
            encoder_version: self.encoder.version(),
            encoded_columns: self.encoder.known_columns(),
            history: self.store.describe(),
        }
    }

    pub fn history(&self) -> &dyn ResultStore {
        self.store.as_ref()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encoder(&self) -> &EncoderStore {
        &self.encoder
    }
}
