//! Batch Module - Uploaded tabular data
//!
//! `RawBatch` is the only way data enters the pipeline. Construction checks
//! the shape (non-empty, every row as wide as the header), so every stage
//! after it can treat the batch as well-formed.

pub mod frame;
pub mod value;

use std::collections::HashMap;
use std::io::Read;

pub use frame::{ColumnData, ColumnKind, EncodedFrame, Frame, FrameColumn};
pub use value::RawValue;

// ============================================================================
// ERRORS
// ============================================================================

/// Input-shape errors, reported before the pipeline runs
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("batch is empty")]
    Empty,

    #[error("batch is not tabular: {0}")]
    Malformed(String),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ============================================================================
// RAW BATCH
// ============================================================================

/// Ordered rows sharing one column set
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch {
    columns: Vec<String>,
    rows: Vec<Vec<RawValue>>,
    /// Columns holding at least one text cell
    text_columns: Vec<bool>,
}

impl RawBatch {
    /// Build from a header and row cells
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawValue>>) -> Result<Self, BatchError> {
        if rows.is_empty() {
            return Err(BatchError::Empty);
        }
        if columns.is_empty() {
            return Err(BatchError::Malformed("no columns".to_string()));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(BatchError::Malformed(format!(
                "row {} has {} cells, header has {}",
                i,
                row.len(),
                columns.len()
            )));
        }

        let text_columns = (0..columns.len())
            .map(|idx| rows.iter().any(|row| matches!(row[idx], RawValue::Text(_))))
            .collect();

        Ok(Self { columns, rows, text_columns })
    }

    /// Parse a CSV upload (header row required)
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, BatchError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = dedupe_names(headers.iter());

        let mut rows = Vec::new();
        for (row_num, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) if matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. }) => {
                    return Err(BatchError::Malformed(format!("CSV row {row_num}: {e}")));
                }
                Err(e) => return Err(BatchError::Csv(e)),
            };
            rows.push(record.iter().map(RawValue::parse_cell).collect());
        }

        Self::new(columns, rows)
    }

    /// Build from JSON records (array of objects). Column order follows first appearance.
    pub fn from_records(records: &[serde_json::Value]) -> Result<Self, BatchError> {
        if records.is_empty() {
            return Err(BatchError::Empty);
        }

        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or_else(|| BatchError::Malformed(format!("record {} is not an object", i)))?;
            for key in object.keys() {
                if !positions.contains_key(key) {
                    positions.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(|r| r.as_object())
            .map(|object| {
                let mut row = vec![RawValue::Missing; columns.len()];
                for (key, value) in object {
                    if let Some(&idx) = positions.get(key) {
                        row[idx] = RawValue::from_json(value);
                    }
                }
                row
            })
            .collect();

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &RawValue> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn row(&self, index: usize) -> Option<&[RawValue]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// Row as a JSON object in column order
    pub fn row_record(&self, index: usize) -> Option<serde_json::Map<String, serde_json::Value>> {
        self.rows.get(index).map(|row| {
            self.columns
                .iter()
                .zip(row.iter())
                .zip(self.text_columns.iter())
                .map(|((name, value), &as_text)| (name.clone(), value.to_json(as_text)))
                .collect()
        })
    }
}

/// Duplicate header names get a `.N` suffix, the way pandas mangles them
fn dedupe_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();

    for name in names {
        let count = seen.entry(name.to_string()).or_insert(0);
        if *count == 0 {
            out.push(name.to_string());
        } else {
            out.push(format!("{}.{}", name, count));
        }
        *count += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_parsing() {
        let csv = "rpm,fuel_type,coolant_temp\n800,Petrol,90\n,Diesel,\n";
        let batch = RawBatch::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(batch.columns(), &["rpm", "fuel_type", "coolant_temp"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.row(0).unwrap()[0].as_number(), Some(800.0));
        assert_eq!(batch.row(1).unwrap()[0], RawValue::Missing);
        assert_eq!(batch.row(1).unwrap()[1], RawValue::Text("Diesel".to_string()));
    }

    #[test]
    fn test_csv_header_only_is_empty() {
        let result = RawBatch::from_csv_reader("a,b\n".as_bytes());
        assert!(matches!(result, Err(BatchError::Empty)));
    }

    #[test]
    fn test_csv_ragged_rows_rejected() {
        let result = RawBatch::from_csv_reader("a,b\n1,2\n3\n".as_bytes());
        assert!(matches!(result, Err(BatchError::Malformed(_))));
    }

    #[test]
    fn test_duplicate_headers_renamed() {
        let batch = RawBatch::from_csv_reader("a,a,b\n1,2,3\n".as_bytes()).unwrap();
        assert_eq!(batch.columns(), &["a", "a.1", "b"]);
    }

    #[test]
    fn test_records_union_of_columns() {
        let records = vec![
            serde_json::json!({"rpm": 900, "gear": "D"}),
            serde_json::json!({"rpm": 1200, "speed": 40}),
        ];
        let batch = RawBatch::from_records(&records).unwrap();

        assert_eq!(batch.columns(), &["rpm", "gear", "speed"]);
        assert_eq!(batch.row(0).unwrap()[2], RawValue::Missing);
        assert_eq!(batch.row(1).unwrap()[1], RawValue::Missing);
    }

    #[test]
    fn test_records_reject_non_objects() {
        let records = vec![serde_json::json!([1, 2])];
        assert!(matches!(RawBatch::from_records(&records), Err(BatchError::Malformed(_))));
        assert!(matches!(RawBatch::from_records(&[]), Err(BatchError::Empty)));
        assert!(matches!(RawBatch::from_csv_reader("".as_bytes()), Err(BatchError::Empty)));
    }

    #[test]
    fn test_row_record_keeps_column_order() {
        let batch = RawBatch::from_csv_reader("z,a\n1,x\n".as_bytes()).unwrap();
        let record = batch.row_record(0).unwrap();
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_row_record_keeps_text_of_codes() {
        let batch = RawBatch::from_csv_reader("dtc,rpm
007,800
P0300,1.50
".as_bytes()).unwrap();

        let record = batch.row_record(0).unwrap();
        assert_eq!(record["dtc"], "007");
        assert_eq!(record["rpm"], 800.0);
        assert_eq!(batch.row_record(1).unwrap()["rpm"], 1.5);
    }
}
