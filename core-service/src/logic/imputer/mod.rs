//! Imputer - Missing value repair
//!
//! Stateless: every fill value is derived from the batch itself.
//!
//! ## Per-column policy
//! - Numeric, some values observed → mean or median (see `NumericStrategy`)
//! - Numeric, nothing observed → 0.0
//! - Categorical, some values observed → most frequent category
//! - Categorical, nothing observed → unknown token
//!
//! A column is categorical when any observed cell is text, or when the caller
//! names it as categorical (columns the encoder already has a vocabulary for).

pub mod stats;

use std::collections::HashSet;

use serde::Serialize;

use crate::constants::{DEFAULT_SKEW_THRESHOLD, DEFAULT_UNKNOWN_TOKEN};
use crate::logic::batch::{ColumnData, ColumnKind, Frame, FrameColumn, RawBatch, RawValue};

// ============================================================================
// STRATEGY
// ============================================================================

/// How numeric fill values are chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumericStrategy {
    Mean,
    Median,
    /// Median when |skewness| exceeds the threshold, mean otherwise
    Auto { skew_threshold: f64 },
}

impl Default for NumericStrategy {
    fn default() -> Self {
        NumericStrategy::Auto { skew_threshold: DEFAULT_SKEW_THRESHOLD }
    }
}

/// What was used to fill one column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum AppliedFill {
    Mean(f64),
    Median(f64),
    Zero,
    MostFrequent(String),
    UnknownToken(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnImputation {
    pub name: String,
    pub kind: ColumnKind,
    pub fill: AppliedFill,
    pub filled: usize,
}

/// Per-column summary of one imputation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImputationReport {
    pub columns: Vec<ColumnImputation>,
}

impl ImputationReport {
    pub fn total_filled(&self) -> usize {
        self.columns.iter().map(|c| c.filled).sum()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnImputation> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ============================================================================
// IMPUTER
// ============================================================================

#[derive(Debug, Clone)]
pub struct Imputer {
    strategy: NumericStrategy,
    unknown_token: String,
    categorical: HashSet<String>,
}

impl Default for Imputer {
    fn default() -> Self {
        Self::new(NumericStrategy::default())
    }
}

impl Imputer {
    pub fn new(strategy: NumericStrategy) -> Self {
        Self {
            strategy,
            unknown_token: DEFAULT_UNKNOWN_TOKEN.to_string(),
            categorical: HashSet::new(),
        }
    }

    pub fn with_unknown_token(mut self, token: impl Into<String>) -> Self {
        self.unknown_token = token.into();
        self
    }

    /// Columns to treat as categorical even when no text is observed
    pub fn with_categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn strategy(&self) -> NumericStrategy {
        self.strategy
    }

    /// Fill every missing cell. Never fails: `RawBatch` is already tabular.
    pub fn impute(&self, batch: &RawBatch) -> (Frame, ImputationReport) {
        let mut columns = Vec::with_capacity(batch.columns().len());
        let mut report = ImputationReport::default();

        for (idx, name) in batch.columns().iter().enumerate() {
            let cells: Vec<&RawValue> = batch.column(idx).collect();
            let is_categorical = self.categorical.contains(name)
                || cells.iter().any(|c| matches!(c, RawValue::Text(_)));

            // non-finite numbers are replaced like missing cells
            let filled = if is_categorical {
                cells.iter().filter(|c| c.is_missing()).count()
            } else {
                cells.iter().filter(|c| c.as_number().is_none()).count()
            };

            let (data, fill) = if is_categorical {
                self.impute_categorical(&cells)
            } else {
                self.impute_numeric(&cells)
            };

            report.columns.push(ColumnImputation {
                name: name.clone(),
                kind: data.kind(),
                fill,
                filled,
            });
            columns.push(FrameColumn { name: name.clone(), data });
        }

        let total = report.total_filled();
        if total > 0 {
            log::debug!("Imputed {} missing cells across {} rows", total, batch.len());
        }

        (Frame { columns, rows: batch.len() }, report)
    }

    fn impute_numeric(&self, cells: &[&RawValue]) -> (ColumnData, AppliedFill) {
        let observed: Vec<f64> = cells.iter().filter_map(|c| c.as_number()).collect();

        let fill = if observed.is_empty() {
            AppliedFill::Zero
        } else {
            self.numeric_fill(&observed)
        };
        let fill_value = match fill {
            AppliedFill::Mean(v) | AppliedFill::Median(v) => v,
            _ => 0.0,
        };

        let values = cells
            .iter()
            .map(|c| c.as_number().unwrap_or(fill_value))
            .collect();

        (ColumnData::Numeric(values), fill)
    }

    fn numeric_fill(&self, observed: &[f64]) -> AppliedFill {
        let use_median = match self.strategy {
            NumericStrategy::Mean => false,
            NumericStrategy::Median => true,
            NumericStrategy::Auto { skew_threshold } => {
                stats::skewness(observed).abs() > skew_threshold
            }
        };

        if use_median {
            AppliedFill::Median(stats::median(observed).unwrap_or(0.0))
        } else {
            AppliedFill::Mean(stats::mean(observed).unwrap_or(0.0))
        }
    }

    fn impute_categorical(&self, cells: &[&RawValue]) -> (ColumnData, AppliedFill) {
        let keys: Vec<Option<String>> = cells.iter().map(|c| c.category_key()).collect();

        let fill = match stats::most_frequent(keys.iter().flatten().map(String::as_str)) {
            Some(mode) => AppliedFill::MostFrequent(mode),
            None => AppliedFill::UnknownToken(self.unknown_token.clone()),
        };
        let fill_value = match &fill {
            AppliedFill::MostFrequent(v) | AppliedFill::UnknownToken(v) => v.clone(),
            _ => self.unknown_token.clone(),
        };

        let values = keys
            .into_iter()
            .map(|k| k.unwrap_or_else(|| fill_value.clone()))
            .collect();

        (ColumnData::Categorical(values), fill)
    }
}
