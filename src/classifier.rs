//! Fixed-length feature encoding and ONNX emotion classification.

use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Value,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::labels::{LabelError, LabelVocabulary};

/// Input width the classifier artifact was trained with
pub const ENCODED_LEN: usize = 180;

/// Errors that can occur during classification
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model not found at path: {0}")]
    ModelNotFound(PathBuf),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Model produced no usable output scores")]
    EmptyOutput,

    #[error("Predicted class {index} outside the vocabulary ({vocab_size} labels)")]
    UnknownClass { index: usize, vocab_size: usize },

    #[error(transparent)]
    Labels(#[from] LabelError),
}

/// Pad or truncate a feature sequence to the classifier's fixed input width.
///
/// Longer inputs keep their first `ENCODED_LEN` values; shorter inputs are
/// copied left-aligned into a zero-initialized buffer.
pub fn encode(features: &[f32]) -> Vec<f32> {
    let mut encoded = vec![0.0f32; ENCODED_LEN];
    let n = features.len().min(ENCODED_LEN);
    encoded[..n].copy_from_slice(&features[..n]);
    encoded
}

/// Prediction seam between the HTTP layer and the model session
pub trait Predictor: Send {
    /// Classify one encoded feature vector into an emotion label
    fn predict(&mut self, encoded: &[f32]) -> Result<String, ClassifierError>;
}

/// ONNX-backed emotion classifier with its persisted label vocabulary
pub struct EmotionClassifier {
    session: Session,
    vocabulary: LabelVocabulary,
}

impl EmotionClassifier {
    /// Load the model artifact and its vocabulary. Both must exist; a
    /// missing artifact is fatal to startup.
    pub fn new(
        model_path: &Path,
        labels_path: &Path,
        n_threads: i32,
    ) -> Result<Self, ClassifierError> {
        if !model_path.exists() {
            return Err(ClassifierError::ModelNotFound(model_path.to_path_buf()));
        }

        let vocabulary = LabelVocabulary::load(labels_path)?;

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?
            .with_intra_threads(n_threads as usize)
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;

        info!(
            "Loaded emotion classifier from {:?} ({} labels)",
            model_path,
            vocabulary.len()
        );

        Ok(Self {
            session,
            vocabulary,
        })
    }
}

impl Predictor for EmotionClassifier {
    fn predict(&mut self, encoded: &[f32]) -> Result<String, ClassifierError> {
        // Single-row batch: [1, ENCODED_LEN]. A width the model does not
        // expect fails inside the session run.
        let input_shape = [1_usize, encoded.len()];
        let input_tensor = Value::from_array((input_shape, encoded.to_vec()))
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let output = outputs.iter().next().ok_or(ClassifierError::EmptyOutput)?;

        let scores = output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let index = argmax(scores.1).ok_or(ClassifierError::EmptyOutput)?;

        let label = self
            .vocabulary
            .label(index)
            .ok_or(ClassifierError::UnknownClass {
                index,
                vocab_size: self.vocabulary.len(),
            })?;

        debug!("Predicted class {} -> {}", index, label);

        Ok(label.to_string())
    }
}

/// Index of the highest score. NaN scores never win.
fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}
