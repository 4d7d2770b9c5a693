//! Acoustic feature extraction.
//!
//! Five feature groups, each averaged over time and concatenated in a fixed
//! order: cepstral coefficients (40), chroma (12), mel-band energies (128),
//! mean pitch (1), RMS energy (1). Groups can be toggled individually; all
//! are enabled by default.

mod chroma;
mod mel;
mod mfcc;
mod pitch;
mod stft;

use thiserror::Error;

use crate::config::AnalysisConfig;
use chroma::ChromaFolder;
use mel::MelFilterbank;
use mfcc::Dct;
use stft::Stft;

/// Errors that can occur during feature extraction
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Audio clip contains no samples")]
    EmptyAudio,

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("FFT failed: {0}")]
    Fft(String),
}

/// Which feature groups to compute
#[derive(Debug, Clone, Copy)]
pub struct FeatureSelection {
    pub mfcc: bool,
    pub chroma: bool,
    pub mel: bool,
    pub pitch: bool,
    pub energy: bool,
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self {
            mfcc: true,
            chroma: true,
            mel: true,
            pitch: true,
            energy: true,
        }
    }
}

/// Feature extractor for one clip's sample rate.
///
/// The filterbanks depend on the clip's native sample rate, so an extractor
/// is built per request from the shared analysis parameters.
pub struct FeatureExtractor {
    config: AnalysisConfig,
    sample_rate: u32,
    stft: Stft,
    mel: MelFilterbank,
    dct: Dct,
    chroma: ChromaFolder,
}

impl FeatureExtractor {
    pub fn new(config: AnalysisConfig, sample_rate: u32) -> Result<Self, FeatureError> {
        if sample_rate == 0 {
            return Err(FeatureError::InvalidSampleRate(sample_rate));
        }

        let stft = Stft::new(config.n_fft, config.hop_length);
        let mel = MelFilterbank::new(
            config.n_mels,
            stft.n_bins(),
            sample_rate as f32,
            config.fmin,
            sample_rate as f32 / 2.0,
        );
        let dct = Dct::new(config.n_mfcc, config.n_mels);
        let chroma = ChromaFolder::new(
            config.n_chroma,
            stft.n_bins(),
            config.n_fft,
            sample_rate as f32,
        );

        Ok(Self {
            config,
            sample_rate,
            stft,
            mel,
            dct,
            chroma,
        })
    }

    /// Extract the concatenated feature sequence for `samples`.
    ///
    /// Enabled groups are appended in a fixed order: cepstral coefficients,
    /// chroma, mel energies, pitch, RMS energy.
    pub fn extract(
        &mut self,
        samples: &[f32],
        selection: FeatureSelection,
    ) -> Result<Vec<f32>, FeatureError> {
        if samples.is_empty() {
            return Err(FeatureError::EmptyAudio);
        }

        let spectra = if selection.mfcc || selection.chroma || selection.mel {
            self.stft.power_spectra(samples)?
        } else {
            Vec::new()
        };

        let mut features = Vec::new();

        if selection.mfcc {
            let coeff_frames = spectra.iter().map(|spec| {
                let log_mel: Vec<f32> = self
                    .mel
                    .apply(spec)
                    .into_iter()
                    .map(|e| (e + self.config.log_offset).ln())
                    .collect();
                self.dct.apply(&log_mel)
            });
            features.extend(mean_over_frames(coeff_frames, self.config.n_mfcc));
        }

        if selection.chroma {
            let chroma_frames = spectra.iter().map(|spec| self.chroma.apply(spec));
            features.extend(mean_over_frames(chroma_frames, self.config.n_chroma));
        }

        if selection.mel {
            let mel_frames = spectra.iter().map(|spec| self.mel.apply(spec));
            features.extend(mean_over_frames(mel_frames, self.config.n_mels));
        }

        if selection.pitch {
            features.push(pitch::mean_pitch(samples, self.sample_rate as usize));
        }

        if selection.energy {
            features.push(self.mean_rms(samples));
        }

        Ok(features)
    }

    /// Mean per-frame RMS energy
    fn mean_rms(&self, samples: &[f32]) -> f32 {
        let frame_len = self.config.n_fft;
        let hop = self.config.hop_length;

        let n_frames = if samples.len() >= frame_len {
            1 + (samples.len() - frame_len) / hop
        } else {
            1
        };

        let mut sum = 0.0f32;
        for frame_idx in 0..n_frames {
            let start = frame_idx * hop;
            let end = (start + frame_len).min(samples.len());
            // Denominator stays at the full frame length: the tail frame is
            // implicitly zero-padded
            let power: f32 = samples[start..end].iter().map(|s| s * s).sum::<f32>()
                / frame_len as f32;
            sum += power.sqrt();
        }
        sum / n_frames as f32
    }
}

/// Column-wise mean across frames
fn mean_over_frames<I>(frames: I, width: usize) -> Vec<f32>
where
    I: Iterator<Item = Vec<f32>>,
{
    let mut sums = vec![0.0f32; width];
    let mut count = 0usize;

    for frame in frames {
        for (acc, v) in sums.iter_mut().zip(frame.iter()) {
            *acc += v;
        }
        count += 1;
    }

    if count > 0 {
        for acc in sums.iter_mut() {
            *acc /= count as f32;
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 22050;

    fn generate_sine(freq: f32, duration_ms: u32) -> Vec<f32> {
        let num_samples = (SAMPLE_RATE * duration_ms / 1000) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                (2.0 * PI * freq * t).sin() * 0.5
            })
            .collect()
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(AnalysisConfig::default(), SAMPLE_RATE).unwrap()
    }

    #[test]
    fn test_full_selection_length() {
        let mut ext = extractor();
        let samples = generate_sine(200.0, 800);
        let features = ext.extract(&samples, FeatureSelection::default()).unwrap();

        // 40 mfcc + 12 chroma + 128 mel + pitch + energy
        assert_eq!(features.len(), 182);
    }

    #[test]
    fn test_length_is_stable_across_clips() {
        let mut ext = extractor();
        let short = ext
            .extract(&generate_sine(150.0, 300), FeatureSelection::default())
            .unwrap();
        let long = ext
            .extract(&generate_sine(330.0, 1500), FeatureSelection::default())
            .unwrap();
        assert_eq!(short.len(), long.len());
    }

    #[test]
    fn test_silence_keeps_layout_with_nan_pitch() {
        let mut ext = extractor();
        let samples = vec![0.0f32; SAMPLE_RATE as usize];
        let features = ext.extract(&samples, FeatureSelection::default()).unwrap();

        assert_eq!(features.len(), 182);
        // Unvoiced input: the pitch slot is the mean of an empty set
        assert!(features[180].is_nan());
        // Silence has zero energy
        assert_eq!(features[181], 0.0);
    }

    #[test]
    fn test_tone_pitch_and_energy_slots() {
        let mut ext = extractor();
        let samples = generate_sine(220.0, 1000);
        let features = ext.extract(&samples, FeatureSelection::default()).unwrap();

        let pitch = features[180];
        assert!(
            (pitch - 220.0).abs() < 20.0,
            "expected ~220 Hz pitch, got {}",
            pitch
        );
        assert!(features[181] > 0.1, "expected audible RMS energy");
    }

    #[test]
    fn test_group_toggles_shrink_output() {
        let mut ext = extractor();
        let samples = generate_sine(200.0, 500);

        let only_mel = FeatureSelection {
            mfcc: false,
            chroma: false,
            mel: true,
            pitch: false,
            energy: false,
        };
        assert_eq!(ext.extract(&samples, only_mel).unwrap().len(), 128);

        let no_spectral = FeatureSelection {
            mfcc: false,
            chroma: false,
            mel: false,
            pitch: true,
            energy: true,
        };
        assert_eq!(ext.extract(&samples, no_spectral).unwrap().len(), 2);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let mut ext = extractor();
        let samples = generate_sine(180.0, 600);

        let a = ext.extract(&samples, FeatureSelection::default()).unwrap();
        let b = ext.extract(&samples, FeatureSelection::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_audio_rejected() {
        let mut ext = extractor();
        assert!(matches!(
            ext.extract(&[], FeatureSelection::default()),
            Err(FeatureError::EmptyAudio)
        ));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(matches!(
            FeatureExtractor::new(AnalysisConfig::default(), 0),
            Err(FeatureError::InvalidSampleRate(0))
        ));
    }
}
