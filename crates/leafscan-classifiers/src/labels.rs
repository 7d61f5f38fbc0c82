//! Label tables mapping class indices to human-readable names

use crate::config::LabelSource;
use leafscan_core::LoadError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Immutable, cheaply cloned label table
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    labels: Arc<[String]>,
}

/// Accepted on-disk shapes: a list, an index→name map, or a map nested
/// under `names` (the layout YOLO-style exports use).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabels {
    List(Vec<String>),
    Map(HashMap<RawIndex, String>),
    Nested { names: Box<RawLabels> },
}

#[derive(Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
enum RawIndex {
    Int(usize),
    Str(String),
}

impl LabelTable {
    /// Build a table from an ordered list of labels
    pub fn new(labels: Vec<String>) -> Result<Self, LoadError> {
        if labels.is_empty() {
            return Err(LoadError::labels("label table is empty"));
        }
        if let Some(index) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(LoadError::labels(format!("label {} is blank", index)));
        }

        Ok(Self {
            labels: labels.into(),
        })
    }

    /// Resolve a configured label source
    pub fn load(source: &LabelSource) -> Result<Self, LoadError> {
        match source {
            LabelSource::Inline(labels) => Self::new(labels.clone()),
            LabelSource::File(path) => Self::from_file(path),
        }
    }

    /// Read a label file.
    ///
    /// `.json`, `.yaml` and `.yml` files hold a list or an index map; anything
    /// else is read as one label per line, skipping blank lines and `#`
    /// comments.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoadError::labels(format!("failed to read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        let table = match extension.as_deref() {
            Some("json") => {
                let raw: RawLabels = serde_json::from_str(&content).map_err(|e| {
                    LoadError::labels(format!("failed to parse {}: {}", path.display(), e))
                })?;
                Self::from_raw(raw)
            }
            Some("yaml") | Some("yml") => {
                let raw: RawLabels = serde_yaml::from_str(&content).map_err(|e| {
                    LoadError::labels(format!("failed to parse {}: {}", path.display(), e))
                })?;
                Self::from_raw(raw)
            }
            _ => Self::from_lines(&content),
        }?;

        tracing::debug!("Loaded {} labels from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse a plain-text table, one label per line
    pub fn from_lines(content: &str) -> Result<Self, LoadError> {
        let labels = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();
        Self::new(labels)
    }

    fn from_raw(raw: RawLabels) -> Result<Self, LoadError> {
        match raw {
            RawLabels::List(labels) => Self::new(labels),
            RawLabels::Nested { names } => Self::from_raw(*names),
            RawLabels::Map(map) => {
                let mut indexed: Vec<(usize, String)> = Vec::with_capacity(map.len());
                for (key, label) in map {
                    let index = match key {
                        RawIndex::Int(i) => i,
                        RawIndex::Str(s) => s.trim().parse().map_err(|_| {
                            LoadError::labels(format!("label key '{}' is not a class index", s))
                        })?,
                    };
                    indexed.push((index, label));
                }
                indexed.sort_by_key(|(index, _)| *index);

                for (expected, (index, _)) in indexed.iter().enumerate() {
                    if *index != expected {
                        return Err(LoadError::labels(format!(
                            "class indices must be contiguous from 0: expected {}, found {}",
                            expected, index
                        )));
                    }
                }

                Self::new(indexed.into_iter().map(|(_, label)| label).collect())
            }
        }
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table is empty (never true for a constructed table)
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label for a class index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// All labels, indexed by class
    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Shared handle to the labels
    pub fn shared(&self) -> Arc<[String]> {
        Arc::clone(&self.labels)
    }
}
