use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Get the default directory for service artifacts
pub fn default_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(".emotion-service"))
}

/// Get the default classifier artifact path
pub fn default_model_path() -> Result<PathBuf> {
    Ok(default_config_dir()?.join("models").join("emotion.onnx"))
}

/// The label vocabulary lives next to the model it was trained with
pub fn default_labels_path(model_path: &Path) -> PathBuf {
    match model_path.parent() {
        Some(dir) => dir.join("labels.json"),
        None => PathBuf::from("labels.json"),
    }
}

/// Spectral analysis parameters.
///
/// Defaults match the configuration the classifier artifact was trained
/// against; changing them shifts the feature layout and invalidates the
/// model's expected input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// FFT size for the shared STFT
    pub n_fft: usize,

    /// Hop length between frames (in samples)
    pub hop_length: usize,

    /// Number of cepstral coefficients per frame
    pub n_mfcc: usize,

    /// Number of mel frequency bands
    pub n_mels: usize,

    /// Number of chroma bins (pitch classes)
    pub n_chroma: usize,

    /// Minimum frequency for the mel filterbank (Hz); maximum is Nyquist
    pub fmin: f32,

    /// Small value added before log for numerical stability
    pub log_offset: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mfcc: 40,
            n_mels: 128,
            n_chroma: 12,
            fmin: 0.0,
            log_offset: 1e-10,
        }
    }
}
