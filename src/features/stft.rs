//! Short-time Fourier transform shared by the spectral feature groups.

use realfft::{RealFftPlanner, RealToComplex};
use std::f32::consts::PI;
use std::sync::Arc;

use super::FeatureError;

/// Hann-windowed STFT with a pre-planned FFT and reusable buffers
pub struct Stft {
    n_fft: usize,
    hop_length: usize,
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    // Pre-allocated buffers
    fft_input: Vec<f32>,
    fft_output: Vec<realfft::num_complex::Complex<f32>>,
}

impl Stft {
    pub fn new(n_fft: usize, hop_length: usize) -> Self {
        let window: Vec<f32> = (0..n_fft)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (n_fft - 1) as f32).cos()))
            .collect();

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n_fft);

        let fft_input = vec![0.0f32; n_fft];
        let fft_output = vec![realfft::num_complex::Complex::new(0.0, 0.0); n_fft / 2 + 1];

        Self {
            n_fft,
            hop_length,
            fft,
            window,
            fft_input,
            fft_output,
        }
    }

    /// Number of frequency bins per frame
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Compute the power spectrum of every frame.
    ///
    /// Frames start every `hop_length` samples; the tail frame is
    /// zero-padded, and input shorter than one window yields a single frame.
    pub fn power_spectra(&mut self, samples: &[f32]) -> Result<Vec<Vec<f32>>, FeatureError> {
        if samples.is_empty() {
            return Err(FeatureError::EmptyAudio);
        }

        let n_frames = if samples.len() >= self.n_fft {
            1 + (samples.len() - self.n_fft) / self.hop_length
        } else {
            1
        };

        let mut spectra = Vec::with_capacity(n_frames);

        for frame_idx in 0..n_frames {
            let start = frame_idx * self.hop_length;
            let end = (start + self.n_fft).min(samples.len());

            self.fft_input.fill(0.0);
            for (i, &sample) in samples[start..end].iter().enumerate() {
                self.fft_input[i] = sample * self.window[i];
            }

            self.fft
                .process(&mut self.fft_input, &mut self.fft_output)
                .map_err(|e| FeatureError::Fft(e.to_string()))?;

            spectra.push(
                self.fft_output
                    .iter()
                    .map(|c| c.re * c.re + c.im * c.im)
                    .collect(),
            );
        }

        Ok(spectra)
    }
}
