//! WAV decoding into mono f32 samples.

use hound::{SampleFormat, WavReader};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while decoding an uploaded clip
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Failed to decode audio: {0}")]
    Decode(#[from] hound::Error),

    #[error("Audio stream contains no samples")]
    Empty,

    #[error("Unsupported sample format: {bits} bit {format:?}")]
    UnsupportedFormat { bits: u16, format: SampleFormat },
}

/// A decoded clip: mono samples plus the stream's native sample rate
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode a WAV file into mono f32 samples at the native sample rate.
///
/// Integer PCM is normalized to [-1, 1]; multi-channel audio is mixed down
/// by averaging channels per frame.
pub fn read_wav(path: &Path) -> Result<AudioClip, AudioError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits) if bits <= 32 => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
        (format, bits) => return Err(AudioError::UnsupportedFormat { bits, format }),
    };

    if interleaved.is_empty() {
        return Err(AudioError::Empty);
    }

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(AudioClip {
        samples,
        sample_rate: spec.sample_rate,
    })
}
