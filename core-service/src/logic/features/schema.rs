//! Feature Schema - The classifier's expected input layout
//!
//! **This type controls the feature contract with the model**
//!
//! The order of names is the order of columns in every feature vector. It is
//! loaded once from the training-time artifact and never changes while the
//! process runs.

use std::collections::HashMap;
use std::path::Path;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::artifact::{self, ArtifactError};

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

#[derive(Debug, Clone)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
    hash: u32,
}

impl FeatureSchema {
    /// Build from ordered names. Empty lists and duplicates are rejected.
    pub fn new(names: Vec<String>) -> Result<Self, String> {
        if names.is_empty() {
            return Err("feature list is empty".to_string());
        }

        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(format!("duplicate feature '{}'", name));
            }
        }

        let hash = compute_layout_hash(&names);
        Ok(Self { names, index, hash })
    }

    /// Load the feature list artifact (JSON array of names)
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let names: Vec<String> = artifact::read_json(path)?;
        let schema = Self::new(names).map_err(|reason| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;

        log::info!(
            "Loaded feature schema from {:?}: {} features (hash: {:08x})",
            path,
            schema.len(),
            schema.layout_hash()
        );
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Get feature index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get feature name by index
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn layout_hash(&self) -> u32 {
        self.hash
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            hash: self.hash,
            feature_count: self.len(),
            feature_names: self.names.clone(),
        }
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over names in order, NUL separated.
/// Lets operators spot a swapped feature-list artifact.
pub fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Layout information for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_index_lookup() {
        let schema = FeatureSchema::new(names(&["rpm", "speed", "fuel"])).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.index_of("speed"), Some(1));
        assert_eq!(schema.index_of("nonexistent"), None);
        assert_eq!(schema.name_at(2), Some("fuel"));
        assert_eq!(schema.name_at(3), None);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(FeatureSchema::new(vec![]).is_err());
        assert!(FeatureSchema::new(names(&["a", "b", "a"])).is_err());
    }

    #[test]
    fn test_layout_hash_depends_on_order() {
        let a = compute_layout_hash(&names(&["rpm", "speed"]));
        let b = compute_layout_hash(&names(&["speed", "rpm"]));
        assert_ne!(a, b);
        assert_eq!(a, compute_layout_hash(&names(&["rpm", "speed"])));
    }

    #[test]
    fn test_load_from_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature_columns.json");
        std::fs::write(&path, r#"["rpm", "speed"]"#).unwrap();

        let schema = FeatureSchema::load(&path).unwrap();
        assert_eq!(schema.names(), &["rpm", "speed"]);
        assert_eq!(schema.info().feature_count, 2);
    }

    #[test]
    fn test_load_rejects_duplicate_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature_columns.json");
        std::fs::write(&path, r#"["rpm", "rpm"]"#).unwrap();

        assert!(matches!(FeatureSchema::load(&path), Err(ArtifactError::Invalid { .. })));
    }
}
