//! Persisted emotion label vocabulary.
//!
//! The classifier outputs an integer class index; this table maps it back to
//! a label. The mapping is a versioned artifact stored next to the model so
//! the training-time encoding order travels with the weights instead of
//! being recomputed from a source literal.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur loading or validating the vocabulary
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Label vocabulary not found at path: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read label vocabulary: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse label vocabulary: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid label vocabulary: {0}")]
    Invalid(String),
}

/// Ordered label table. Index order must match the encoding used when the
/// model was trained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelVocabulary {
    pub schema_version: u32,
    labels: Vec<String>,
}

impl LabelVocabulary {
    /// The 8 emotions of the trained classifier, in encoder order.
    ///
    /// The training encoder assigned indices by sorting the label set, so
    /// the persisted order is lexicographic.
    pub fn observed_emotions() -> Self {
        Self {
            schema_version: 1,
            labels: [
                "angry",
                "calm",
                "disgust",
                "fearful",
                "happy",
                "neutral",
                "sad",
                "surprised",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Load and validate a vocabulary artifact
    pub fn load(path: &Path) -> Result<Self, LabelError> {
        if !path.exists() {
            return Err(LabelError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let vocabulary: Self = serde_json::from_str(&content)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Save the vocabulary artifact
    pub fn save(&self, path: &Path) -> Result<(), LabelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), LabelError> {
        if self.labels.is_empty() {
            return Err(LabelError::Invalid("empty label list".to_string()));
        }
        for (i, label) in self.labels.iter().enumerate() {
            if self.labels[..i].contains(label) {
                return Err(LabelError::Invalid(format!("duplicate label: {label}")));
            }
        }
        Ok(())
    }

    /// Label for a predicted class index
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}
