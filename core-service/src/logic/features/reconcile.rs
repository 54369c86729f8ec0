//! Schema Reconciler - encoded frame → fixed-width feature matrix
//!
//! Total over any column set: expected features missing from the batch are
//! synthesized as zero, batch columns the model does not know are dropped.
//! Width always equals the schema length and column order always follows it.

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::Serialize;

use super::schema::FeatureSchema;
use crate::logic::batch::EncodedFrame;

// ============================================================================
// FEATURE MATRIX
// ============================================================================

/// One feature vector per row, ordered by the schema
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    values: Array2<f32>,
    layout_hash: u32,
}

impl FeatureMatrix {
    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    /// Feature vector of one row
    pub fn row(&self, index: usize) -> ArrayView1<'_, f32> {
        self.values.row(index)
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }
}

/// Which columns were synthesized or dropped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub synthesized: Vec<String>,
    pub dropped: Vec<String>,
}

impl ReconcileReport {
    pub fn is_exact(&self) -> bool {
        self.synthesized.is_empty() && self.dropped.is_empty()
    }
}

// ============================================================================
// RECONCILE
// ============================================================================

pub fn reconcile(frame: &EncodedFrame, schema: &FeatureSchema) -> (FeatureMatrix, ReconcileReport) {
    let rows = frame.rows;
    let mut values = Array2::<f32>::zeros((rows, schema.len()));
    let mut report = ReconcileReport::default();

    for (col, name) in schema.names().iter().enumerate() {
        match frame.column(name) {
            Some(source) => {
                for (row, &v) in source.iter().enumerate().take(rows) {
                    values[[row, col]] = v as f32;
                }
            }
            None => report.synthesized.push(name.clone()),
        }
    }

    report.dropped = frame
        .column_names()
        .filter(|name| schema.index_of(name).is_none())
        .map(str::to_string)
        .collect();

    if !report.is_exact() {
        log::debug!(
            "Schema drift: {} features synthesized as zero, {} columns dropped",
            report.synthesized.len(),
            report.dropped.len()
        );
    }

    let matrix = FeatureMatrix {
        values,
        layout_hash: schema.layout_hash(),
    };
    (matrix, report)
}
