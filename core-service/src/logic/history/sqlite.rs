//! SQLite result store
//!
//! The connection is opened on first use, so a missing or locked database
//! only affects persistence and never startup. A failed open is retried on
//! the next batch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use super::{HistoryRecord, ResultStore, StoreError, StoredPrediction};
use crate::logic::labels::PredictionResult;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteResultStore {
    /// `None` for in-memory stores
    path: Option<PathBuf>,
    table: String,
    conn: Mutex<Option<Connection>>,
}

impl SqliteResultStore {
    /// Store backed by a database file, opened lazily
    pub fn new(path: &Path, table: &str) -> Result<Self, StoreError> {
        Ok(Self {
            path: Some(path.to_path_buf()),
            table: validate_table_name(table)?,
            conn: Mutex::new(None),
        })
    }

    /// Store that lives only as long as the process
    pub fn in_memory(table: &str) -> Result<Self, StoreError> {
        let table = validate_table_name(table)?;
        let conn = Connection::open_in_memory()?;
        create_table(&conn, &table)?;
        Ok(Self {
            path: None,
            table,
            conn: Mutex::new(Some(conn)),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Run `f` on the open connection, opening it first if needed
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection, &str) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock();
        if guard.is_none() {
            let path = self.path.as_deref().ok_or_else(|| StoreError::Open {
                path: ":memory:".to_string(),
                reason: "connection lost".to_string(),
            })?;
            *guard = Some(open(path, &self.table)?);
        }

        match guard.as_mut() {
            Some(conn) => f(conn, &self.table),
            None => Err(StoreError::Open {
                path: self.describe(),
                reason: "connection unavailable".to_string(),
            }),
        }
    }
}

fn open(path: &Path, table: &str) -> Result<Connection, StoreError> {
    let open_err = |reason: String| StoreError::Open {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| open_err(format!("Failed to create data dir: {}", e)))?;
    }

    let conn = Connection::open(path).map_err(|e| open_err(e.to_string()))?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    create_table(&conn, table)?;

    log::info!("Opened prediction history at {:?} (table {})", path, table);
    Ok(conn)
}

fn create_table(conn: &Connection, table: &str) -> Result<(), StoreError> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                batch_id TEXT NOT NULL,
                row_index INTEGER NOT NULL,
                recorded_at TEXT NOT NULL,
                record_json TEXT NOT NULL,
                class_index INTEGER NOT NULL,
                Predicted_Fault TEXT NOT NULL,
                Prediction_Message TEXT NOT NULL
            )"
        ),
        [],
    )?;

    conn.execute(
        &format!("CREATE INDEX IF NOT EXISTS idx_{table}_batch ON {table}(batch_id)"),
        [],
    )?;

    Ok(())
}

/// Table names are interpolated into SQL, so only identifiers are allowed
fn validate_table_name(table: &str) -> Result<String, StoreError> {
    let mut chars = table.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(table.to_string())
    } else {
        Err(StoreError::InvalidTable(table.to_string()))
    }
}

impl ResultStore for SqliteResultStore {
    fn append(&self, records: &[HistoryRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        self.with_conn(|conn, table| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT INTO {table}
                     (batch_id, row_index, recorded_at, record_json, class_index,
                      Predicted_Fault, Prediction_Message)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ))?;

                for record in records {
                    let fields = serde_json::to_string(&record.fields)?;
                    stmt.execute(params![
                        record.batch_id,
                        record.row_index as i64,
                        record.recorded_at.to_rfc3339(),
                        fields,
                        record.prediction.class_index,
                        record.prediction.fault_category.as_str(),
                        record.prediction.advisory_message,
                    ])?;
                }
            }
            tx.commit()?;

            log::debug!("Appended {} rows to {}", records.len(), table);
            Ok(records.len())
        })
    }

    fn count(&self) -> Result<u64, StoreError> {
        self.with_conn(|conn, table| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredPrediction>, StoreError> {
        self.with_conn(|conn, table| {
            let mut stmt = conn.prepare(&format!(
                "SELECT id, batch_id, row_index, recorded_at, record_json, class_index
                 FROM {table}
                 ORDER BY id DESC
                 LIMIT ?1"
            ))?;

            let rows = stmt.query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?;

            let mut out = Vec::new();
            for row in rows {
                let (id, batch_id, row_index, recorded_at, record_json, class_index) = row?;
                let fields = serde_json::from_str(&record_json)?;
                let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_default();

                out.push(StoredPrediction {
                    id,
                    record: HistoryRecord {
                        batch_id,
                        row_index: row_index.max(0) as usize,
                        fields,
                        prediction: PredictionResult::from_class_index(class_index),
                        recorded_at,
                    },
                });
            }
            Ok(out)
        })
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("{}#{}", path.display(), self.table),
            None => format!(":memory:#{}", self.table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::labels::FaultCategory;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(batch_id: &str, row_index: usize, class_index: i64) -> HistoryRecord {
        let fields = json!({ "vehicle_id": row_index, "fuel_type": "Diesel" });
        HistoryRecord {
            batch_id: batch_id.to_string(),
            row_index,
            fields: fields.as_object().cloned().unwrap(),
            prediction: PredictionResult::from_class_index(class_index),
            recorded_at: Utc::now(),
        }
    }

    fn create_test_store() -> (SqliteResultStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteResultStore::new(&dir.path().join("history.db"), "fault_predictions").unwrap();
        (store, dir)
    }

    #[test]
    fn test_append_and_count() {
        let (store, _dir) = create_test_store();
        let written = store.append(&[record("b1", 0, 3), record("b1", 1, 2)]).unwrap();

        assert_eq!(written, 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_recent_newest_first() {
        let (store, _dir) = create_test_store();
        store.append(&[record("b1", 0, 3)]).unwrap();
        store.append(&[record("b2", 0, 4), record("b2", 1, 9)]).unwrap();

        let recent = store.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].record.batch_id, "b2");
        assert_eq!(recent[0].record.row_index, 1);
        assert_eq!(recent[0].record.prediction.fault_category, FaultCategory::Unknown);
        assert_eq!(recent[1].record.prediction.fault_category, FaultCategory::TransmissionFault);
        assert!(recent[0].id > recent[1].id);
        assert_eq!(recent[0].record.fields["fuel_type"], "Diesel");
    }

    #[test]
    fn test_history_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.db");

        SqliteResultStore::new(&path, "fault_predictions")
            .unwrap()
            .append(&[record("b1", 0, 0)])
            .unwrap();

        let reopened = SqliteResultStore::new(&path, "fault_predictions").unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn test_unavailable_store_reports_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let store = SqliteResultStore::new(&blocker.join("history.db"), "fault_predictions").unwrap();
        let result = store.append(&[record("b1", 0, 3)]);

        assert!(matches!(result, Err(StoreError::Open { .. })));
    }

    #[test]
    fn test_table_name_validation() {
        assert!(SqliteResultStore::in_memory("fault_predictions").is_ok());
        assert!(SqliteResultStore::in_memory("_t2").is_ok());
        for bad in ["", "1table", "drop table x;", "a-b"] {
            assert!(matches!(
                SqliteResultStore::in_memory(bad),
                Err(StoreError::InvalidTable(_))
            ));
        }
    }

    #[test]
    fn test_output_appends_prediction_fields_last() {
        let output = record("b1", 0, 3).to_output();
        let keys: Vec<&str> = output.keys().map(|k| k.as_str()).collect();

        assert_eq!(keys, vec!["vehicle_id", "fuel_type", "Predicted_Fault", "Prediction_Message"]);
        assert_eq!(output["Predicted_Fault"], "No Fault");
    }

    #[test]
    fn test_empty_append_is_noop() {
        let store = SqliteResultStore::in_memory("fault_predictions").unwrap();
        assert_eq!(store.append(&[]).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 0);
    }
}
