//! Artifact Files - load/save helpers shared by encoder, schema and model
//!
//! Artifact-load failures are startup errors: the process should not serve
//! batches without its model, vocabularies and feature list.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("failed to load model: {0}")]
    Model(String),
}

/// Read raw artifact bytes
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }

    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a JSON artifact
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let data = read_bytes(path)?;
    serde_json::from_slice(&data).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write JSON via a sibling temp file + rename, so readers never see a torn file
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Vec<String>, _> = read_json(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("list.json");

        write_json_atomic(&path, &vec!["a", "b"]).unwrap();
        let loaded: Vec<String> = read_json(&path).unwrap();

        assert_eq!(loaded, vec!["a", "b"]);
        assert!(!dir.path().join("nested").join("list.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();

        let result: Result<Vec<String>, _> = read_json(&path);
        assert!(matches!(result, Err(ArtifactError::Parse { .. })));
    }
}
