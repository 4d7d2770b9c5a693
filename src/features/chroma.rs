//! Chromagram: spectral energy folded onto the 12 pitch classes.

/// Lowest frequency assigned a pitch class; bins below carry no pitch
/// information and are ignored.
const MIN_PITCHED_HZ: f32 = 20.0;

/// Maps each FFT bin to one of the pitch classes (0 = C)
pub struct ChromaFolder {
    bin_classes: Vec<Option<usize>>,
    n_chroma: usize,
}

impl ChromaFolder {
    pub fn new(n_chroma: usize, n_fft_bins: usize, n_fft: usize, sample_rate: f32) -> Self {
        let bin_hz = sample_rate / n_fft as f32;
        let bin_classes = (0..n_fft_bins)
            .map(|bin| {
                let freq = bin as f32 * bin_hz;
                if freq < MIN_PITCHED_HZ {
                    return None;
                }
                // MIDI note number, folded onto the octave
                let midi = 69.0 + 12.0 * (freq / 440.0).log2();
                Some((midi.round() as i64).rem_euclid(n_chroma as i64) as usize)
            })
            .collect();

        Self {
            bin_classes,
            n_chroma,
        }
    }

    /// Pitch-class energies for one power spectrum frame, normalized so the
    /// strongest class is 1. An all-zero frame stays all-zero.
    pub fn apply(&self, power_spec: &[f32]) -> Vec<f32> {
        let mut chroma = vec![0.0f32; self.n_chroma];
        for (&class, &power) in self.bin_classes.iter().zip(power_spec.iter()) {
            if let Some(class) = class {
                chroma[class] += power;
            }
        }

        let peak = chroma.iter().cloned().fold(0.0f32, f32::max);
        if peak > 0.0 {
            for c in chroma.iter_mut() {
                *c /= peak;
            }
        }
        chroma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder() -> ChromaFolder {
        ChromaFolder::new(12, 1025, 2048, 22050.0)
    }

    #[test]
    fn test_a440_maps_to_class_a() {
        let folder = folder();

        let bin = (440.0 * 2048.0 / 22050.0_f32).round() as usize;
        let mut spec = vec![0.0f32; 1025];
        spec[bin] = 1.0;

        let chroma = folder.apply(&spec);
        assert_eq!(chroma.len(), 12);

        // MIDI 69 (A4) folds to pitch class 9
        let hot = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(hot, 9);
        assert!((chroma[9] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_octaves_fold_together() {
        let folder = folder();
        let mut spec = vec![0.0f32; 1025];
        for freq in [220.0f32, 440.0, 880.0] {
            let bin = (freq * 2048.0 / 22050.0).round() as usize;
            spec[bin] = 1.0;
        }

        let chroma = folder.apply(&spec);
        let hot = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(hot, 9);
    }

    #[test]
    fn test_silent_frame_stays_zero() {
        let folder = folder();
        let spec = vec![0.0f32; 1025];
        let chroma = folder.apply(&spec);
        assert!(chroma.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_sub_audible_bins_ignored() {
        let folder = folder();
        let mut spec = vec![0.0f32; 1025];
        spec[0] = 100.0; // DC
        spec[1] = 100.0; // ~10.8 Hz

        let chroma = folder.apply(&spec);
        assert!(chroma.iter().all(|&c| c == 0.0));
    }
}
