//! Raw audio buffer type
//!
//! One captured utterance: a sample-rate-tagged sequence of signed 16-bit
//! PCM samples. Buffers are owned transiently per call and never persisted
//! by this pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single captured utterance as PCM16 mono samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from raw PCM16 samples
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Load a buffer from a WAV file, mixing multi-channel input down to mono
    pub fn from_wav_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let mut reader = hound::WavReader::open(path.as_ref())
            .map_err(|e| Error::InvalidAudio(format!("wav open failed: {e}")))?;
        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(Error::InvalidAudio(format!(
                "expected 16-bit PCM wav, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        let channels = spec.channels.max(1) as usize;
        let raw: std::result::Result<Vec<i16>, _> = reader.samples::<i16>().collect();
        let raw = raw.map_err(|e| Error::InvalidAudio(format!("wav decode failed: {e}")))?;

        let samples = if channels == 1 {
            raw
        } else {
            raw.chunks(channels)
                .map(|frame| {
                    let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                    (sum / channels as i32) as i16
                })
                .collect()
        };

        Ok(Self::new(samples, spec.sample_rate))
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Convert to normalized f32 samples in [-1.0, 1.0]
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|&s| s as f32 / 32768.0)
            .collect()
    }

    /// Reject buffers the pipeline cannot do anything useful with
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidAudio("sample rate is zero".into()));
        }
        if self.samples.is_empty() {
            return Err(Error::InvalidAudio("buffer is empty".into()));
        }
        Ok(())
    }
}
