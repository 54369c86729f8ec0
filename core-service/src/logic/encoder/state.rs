//! Encoder vocabularies - the persisted artifact
//!
//! One `Vocabulary` per categorical column. Codes only grow: a category keeps
//! the code it was first given for the lifetime of the artifact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What happens to a category the vocabulary has not seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnseenPolicy {
    /// Assign the next unused code and remember it
    #[default]
    Extend,
    /// Map to a fixed code without growing the vocabulary
    Fixed { code: i64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub codes: BTreeMap<String, i64>,
    #[serde(default)]
    pub next_code: i64,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from categories in code order (0, 1, 2, ...)
    pub fn from_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for category in categories {
            vocab.get_or_assign(&category.into());
        }
        vocab
    }

    pub fn lookup(&self, category: &str) -> Option<i64> {
        self.codes.get(category).copied()
    }

    /// Existing code, or the next unused one. Second value is true when assigned now.
    pub fn get_or_assign(&mut self, category: &str) -> (i64, bool) {
        if let Some(code) = self.lookup(category) {
            return (code, false);
        }

        let code = self.next_code;
        self.codes.insert(category.to_string(), code);
        self.next_code = code + 1;
        (code, true)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Keep `next_code` above every stored code (older artifacts may omit it)
    fn normalize(&mut self) {
        let floor = self.codes.values().max().map(|m| m + 1).unwrap_or(0);
        if self.next_code < floor {
            self.next_code = floor;
        }
    }
}

/// All vocabularies plus a version bumped on every growth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderState {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub unseen: UnseenPolicy,
    #[serde(default)]
    pub columns: BTreeMap<String, Vocabulary>,
}

impl EncoderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, vocab: Vocabulary) -> Self {
        self.columns.insert(name.into(), vocab);
        self
    }

    pub fn vocabulary(&self, column: &str) -> Option<&Vocabulary> {
        self.columns.get(column)
    }

    pub fn normalize(&mut self) {
        for vocab in self.columns.values_mut() {
            vocab.normalize();
        }
    }

    pub fn total_categories(&self) -> usize {
        self.columns.values().map(Vocabulary::len).sum()
    }
}
