//! Column-major frames produced by the preparation stages.
//!
//! `Frame` comes out of the imputer (no missing cells, columns typed),
//! `EncodedFrame` out of the encoder (every column numeric).

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    pub name: String,
    pub data: ColumnData,
}

/// Imputed frame: typed columns, no missing cells
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub columns: Vec<FrameColumn>,
    pub rows: usize,
}

impl Frame {
    pub fn column(&self, name: &str) -> Option<&FrameColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Fully numeric frame, ready for schema reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    pub columns: Vec<(String, Vec<f64>)>,
    pub rows: usize,
}

impl EncodedFrame {
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
}
