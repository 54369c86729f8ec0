//! Categorical Encoder - Vocabulary lookup with write-back
//!
//! `EncoderStore` owns the shared `EncoderState`. Code assignment and the
//! write-back to disk happen inside one critical section, so two batches
//! that see the same new category at the same time still agree on its code.

pub mod state;

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

pub use state::{EncoderState, UnseenPolicy, Vocabulary};

use super::artifact::{self, ArtifactError};
use super::batch::{ColumnData, EncodedFrame, Frame};

// ============================================================================
// OUTCOME
// ============================================================================

/// A category that got its code during this batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearnedCategory {
    pub column: String,
    pub category: String,
    pub code: i64,
}

#[derive(Debug)]
pub struct EncodeOutcome {
    pub frame: EncodedFrame,
    pub learned: Vec<LearnedCategory>,
    /// State version after this batch
    pub state_version: u64,
    /// Set when the grown vocabulary could not be written back
    pub persist_error: Option<String>,
}

// ============================================================================
// STORE
// ============================================================================

pub struct EncoderStore {
    path: Option<PathBuf>,
    state: Mutex<EncoderState>,
}

impl EncoderStore {
    /// Load the vocabulary artifact. Missing or corrupt files are fatal.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let mut state: EncoderState = artifact::read_json(path)?;
        state.normalize();

        log::info!(
            "Loaded encoder vocabularies from {:?}: {} columns, {} categories (v{})",
            path,
            state.columns.len(),
            state.total_categories(),
            state.version
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            state: Mutex::new(state),
        })
    }

    /// Store that never touches disk
    pub fn in_memory(mut state: EncoderState) -> Self {
        state.normalize();
        Self {
            path: None,
            state: Mutex::new(state),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Columns with a vocabulary
    pub fn known_columns(&self) -> Vec<String> {
        self.state.lock().columns.keys().cloned().collect()
    }

    pub fn snapshot(&self) -> EncoderState {
        self.state.lock().clone()
    }

    pub fn version(&self) -> u64 {
        self.state.lock().version
    }

    /// Replace categorical columns by their codes; numeric columns pass through.
    pub fn encode(&self, frame: Frame) -> EncodeOutcome {
        let mut state = self.state.lock();
        let policy = state.unseen;
        let mut learned = Vec::new();
        let mut columns = Vec::with_capacity(frame.columns.len());

        for column in frame.columns {
            let values = match column.data {
                ColumnData::Numeric(values) => values,
                ColumnData::Categorical(categories) => {
                    let vocab = state.columns.entry(column.name.clone()).or_default();
                    categories
                        .iter()
                        .map(|category| {
                            encode_value(vocab, policy, &column.name, category, &mut learned) as f64
                        })
                        .collect()
                }
            };
            columns.push((column.name, values));
        }

        let mut persist_error = None;
        if !learned.is_empty() {
            state.version += 1;
            log::info!(
                "Learned {} new categories (encoder v{})",
                learned.len(),
                state.version
            );

            if let Some(path) = &self.path {
                if let Err(e) = artifact::write_json_atomic(path, &*state) {
                    log::warn!("Failed to persist encoder vocabularies to {:?}: {}", path, e);
                    persist_error = Some(e.to_string());
                }
            }
        }

        EncodeOutcome {
            frame: EncodedFrame { columns, rows: frame.rows },
            learned,
            state_version: state.version,
            persist_error,
        }
    }
}

fn encode_value(
    vocab: &mut Vocabulary,
    policy: UnseenPolicy,
    column: &str,
    category: &str,
    learned: &mut Vec<LearnedCategory>,
) -> i64 {
    if let Some(code) = vocab.lookup(category) {
        return code;
    }

    match policy {
        UnseenPolicy::Fixed { code } => code,
        UnseenPolicy::Extend => {
            let (code, _) = vocab.get_or_assign(category);
            learned.push(LearnedCategory {
                column: column.to_string(),
                category: category.to_string(),
                code,
            });
            code
        }
    }
}
