//! Triangular mel filterbank applied to STFT power spectra.

/// Convert frequency to mel scale
fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mel scale to frequency
fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Pre-computed mel filterbank
pub struct MelFilterbank {
    filters: Vec<Vec<f32>>,
}

impl MelFilterbank {
    /// Build `n_mels` triangular filters spanning `fmin..fmax`, expressed as
    /// weights over `n_fft_bins` FFT bins.
    pub fn new(n_mels: usize, n_fft_bins: usize, sample_rate: f32, fmin: f32, fmax: f32) -> Self {
        let mel_min = hz_to_mel(fmin);
        let mel_max = hz_to_mel(fmax);
        let mel_step = (mel_max - mel_min) / (n_mels + 1) as f32;

        // Band edges: n_mels + 2 points equally spaced on the mel scale,
        // mapped to fractional FFT bin positions
        let bin_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| {
                let hz = mel_to_hz(mel_min + mel_step * i as f32);
                (n_fft_bins as f32 - 1.0) * hz / (sample_rate / 2.0)
            })
            .collect();

        let filters = (0..n_mels)
            .map(|m| {
                let (left, center, right) = (bin_points[m], bin_points[m + 1], bin_points[m + 2]);
                let mut filter = vec![0.0f32; n_fft_bins];
                for (bin, weight) in filter.iter_mut().enumerate() {
                    let bin_f = bin as f32;
                    if bin_f >= left && bin_f < center {
                        *weight = (bin_f - left) / (center - left);
                    } else if bin_f >= center && bin_f <= right {
                        *weight = (right - bin_f) / (right - center);
                    }
                }
                filter
            })
            .collect();

        Self { filters }
    }

    /// Mel-band energies for one power spectrum frame
    pub fn apply(&self, power_spec: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|filter| {
                filter
                    .iter()
                    .zip(power_spec.iter())
                    .map(|(w, p)| w * p)
                    .sum()
            })
            .collect()
    }
}
