//! Cepstral coefficients: orthonormal DCT-II over log mel energies.

use std::f32::consts::PI;

/// Pre-computed DCT-II basis, truncated to the first `n_mfcc` rows
pub struct Dct {
    basis: Vec<Vec<f32>>,
}

impl Dct {
    pub fn new(n_mfcc: usize, n_mels: usize) -> Self {
        let scale_first = (1.0 / n_mels as f32).sqrt();
        let scale_rest = (2.0 / n_mels as f32).sqrt();

        let basis = (0..n_mfcc)
            .map(|k| {
                let norm = if k == 0 { scale_first } else { scale_rest };
                (0..n_mels)
                    .map(|n| norm * (PI / n_mels as f32 * (n as f32 + 0.5) * k as f32).cos())
                    .collect()
            })
            .collect();

        Self { basis }
    }

    /// Cepstral coefficients for one frame of log mel energies
    pub fn apply(&self, log_mel: &[f32]) -> Vec<f32> {
        self.basis
            .iter()
            .map(|row| row.iter().zip(log_mel.iter()).map(|(b, x)| b * x).sum())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_width() {
        let dct = Dct::new(40, 128);
        let frame = vec![1.0f32; 128];
        assert_eq!(dct.apply(&frame).len(), 40);
    }

    #[test]
    fn test_constant_input_concentrates_in_c0() {
        let dct = Dct::new(8, 32);
        let frame = vec![3.0f32; 32];
        let coeffs = dct.apply(&frame);

        // DC component: 3 * sqrt(32) for a constant input
        assert!((coeffs[0] - 3.0 * 32.0_f32.sqrt()).abs() < 1e-3);
        for &c in &coeffs[1..] {
            assert!(c.abs() < 1e-3, "expected zero higher coefficient, got {}", c);
        }
    }

    #[test]
    fn test_basis_rows_are_unit_norm() {
        let dct = Dct::new(16, 64);
        for row in &dct.basis {
            let norm: f32 = row.iter().map(|b| b * b).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4);
        }
    }
}
