//! Mean fundamental frequency via the McLeod pitch detector.

use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;

/// Frame size for pitch detection
const FRAME_SIZE: usize = 1024;

/// Hop size between frames (50% overlap)
const HOP_SIZE: usize = 512;

/// Human vocal range bounds (Hz)
const MIN_PITCH: f32 = 50.0;
const MAX_PITCH: f32 = 500.0;

/// Power threshold for pitch detection
const POWER_THRESHOLD: f32 = 0.8;

/// Clarity threshold for pitch detection
const CLARITY_THRESHOLD: f32 = 0.5;

/// Mean of the strictly-positive in-band pitch estimates across frames.
///
/// When no frame yields a positive estimate the mean over the empty set is
/// NaN, and the NaN flows into the feature vector unchanged.
pub fn mean_pitch(samples: &[f32], sample_rate: usize) -> f32 {
    let mut detector = McLeodDetector::new(FRAME_SIZE, FRAME_SIZE / 2);
    let mut sum = 0.0f32;
    let mut voiced = 0usize;

    let mut start = 0;
    while start + FRAME_SIZE <= samples.len() {
        let frame = &samples[start..start + FRAME_SIZE];

        if let Some(pitch) =
            detector.get_pitch(frame, sample_rate, POWER_THRESHOLD, CLARITY_THRESHOLD)
        {
            if pitch.frequency >= MIN_PITCH && pitch.frequency <= MAX_PITCH {
                sum += pitch.frequency;
                voiced += 1;
            }
        }

        start += HOP_SIZE;
    }

    sum / voiced as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn generate_sine(freq: f32, sample_rate: usize, duration_ms: u32) -> Vec<f32> {
        let num_samples = sample_rate * duration_ms as usize / 1000;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * PI * freq * t).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn test_mean_pitch_pure_tone() {
        let samples = generate_sine(200.0, 16000, 1000);
        let pitch = mean_pitch(&samples, 16000);
        assert!(
            (pitch - 200.0).abs() < 20.0,
            "expected ~200 Hz, got {}",
            pitch
        );
    }

    #[test]
    fn test_mean_pitch_silence_is_nan() {
        let samples = vec![0.0f32; 16000];
        assert!(mean_pitch(&samples, 16000).is_nan());
    }

    #[test]
    fn test_mean_pitch_too_short_is_nan() {
        let samples = vec![0.5f32; 100];
        assert!(mean_pitch(&samples, 16000).is_nan());
    }

    #[test]
    fn test_mean_pitch_between_two_tones() {
        let mut samples = generate_sine(150.0, 16000, 500);
        samples.extend(generate_sine(250.0, 16000, 500));

        let pitch = mean_pitch(&samples, 16000);
        assert!(
            pitch > 150.0 && pitch < 250.0,
            "expected mean between tones, got {}",
            pitch
        );
    }
}
