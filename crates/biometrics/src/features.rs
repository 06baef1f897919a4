//! Deterministic spectral voiceprint extraction
//!
//! Frames the utterance (25ms frames, 10ms shift, Hamming window), probes
//! 16 log-spaced frequency bands per frame with the Goertzel algorithm,
//! pools frame energies into equal temporal segments, and L2-normalizes.
//! Identical input always yields identical output, and utterances with a
//! similar spectral envelope score higher cosine similarity than
//! dissimilar ones.

use std::f32::consts::PI;

use xeno_voice_core::{AudioBuffer, Error, Result};

/// Number of probed frequency bands per frame
const NUM_BANDS: usize = 16;
/// Lowest band center in Hz
const LOW_FREQ: f32 = 100.0;
/// Highest band center in Hz
const HIGH_FREQ: f32 = 6000.0;
/// Floor for log energies
const ENERGY_FLOOR: f32 = 1e-10;

/// Spectral embedding extractor with a fixed output dimension
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    dim: usize,
    segments: usize,
}

impl FeatureExtractor {
    /// Create an extractor producing `dim`-dimensional embeddings.
    /// `dim` must be a nonzero multiple of the band count (16).
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 || dim % NUM_BANDS != 0 {
            return Err(Error::Config(format!(
                "feature dim {dim} must be a nonzero multiple of {NUM_BANDS}"
            )));
        }
        Ok(Self {
            dim,
            segments: dim / NUM_BANDS,
        })
    }

    /// Output dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Extract a unit-normalized embedding from one utterance
    pub fn extract(&self, audio: &AudioBuffer) -> Result<Vec<f32>> {
        audio.validate()?;

        let sample_rate = audio.sample_rate() as f32;
        let frame_len = (audio.sample_rate() as usize * 25) / 1000;
        let frame_shift = (audio.sample_rate() as usize * 10) / 1000;
        let samples = audio.to_f32();

        // A 25ms frame needs at least two samples and a nonzero 10ms shift,
        // which rules out sample rates below 100 Hz.
        if frame_len < 2 || frame_shift == 0 {
            return Err(Error::InvalidAudio(format!(
                "sample rate {} Hz too low for framing",
                audio.sample_rate()
            )));
        }
        if samples.len() < frame_len {
            return Err(Error::InvalidAudio(format!(
                "utterance too short: {} samples, need {}",
                samples.len(),
                frame_len
            )));
        }

        let window = hamming_window(frame_len);
        let bands = band_centers(sample_rate);
        let num_frames = (samples.len() - frame_len) / frame_shift + 1;

        // Per-frame log band energies
        let mut frame_energies = Vec::with_capacity(num_frames);
        let mut windowed = vec![0.0f32; frame_len];
        for f in 0..num_frames {
            let offset = f * frame_shift;
            for (i, w) in window.iter().enumerate() {
                windowed[i] = samples[offset + i] * w;
            }
            let energies: Vec<f32> = bands
                .iter()
                .map(|&freq| (goertzel_power(&windowed, freq, sample_rate) + ENERGY_FLOOR).ln())
                .collect();
            frame_energies.push(energies);
        }

        // Pool frames into equal temporal segments
        let mut features = Vec::with_capacity(self.dim);
        for seg in 0..self.segments {
            let start = seg * num_frames / self.segments;
            let end = (((seg + 1) * num_frames) / self.segments).max(start + 1);
            let count = (end - start) as f32;
            for band in 0..NUM_BANDS {
                let sum: f32 = frame_energies[start..end].iter().map(|fe| fe[band]).sum();
                features.push(sum / count);
            }
        }

        l2_normalize(&mut features);
        Ok(features)
    }
}

/// Log-spaced band center frequencies, clamped below Nyquist
fn band_centers(sample_rate: f32) -> Vec<f32> {
    let nyquist = sample_rate / 2.0;
    let high = HIGH_FREQ.min(nyquist * 0.95);
    let ratio = high / LOW_FREQ;
    (0..NUM_BANDS)
        .map(|k| LOW_FREQ * ratio.powf(k as f32 / (NUM_BANDS - 1) as f32))
        .collect()
}

fn hamming_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / (len - 1) as f32).cos())
        .collect()
}

/// Signal power at a single frequency via the Goertzel recurrence
fn goertzel_power(frame: &[f32], freq: f32, sample_rate: f32) -> f32 {
    let omega = 2.0 * PI * freq / sample_rate;
    let coeff = 2.0 * omega.cos();
    let mut s_prev = 0.0f32;
    let mut s_prev2 = 0.0f32;
    for &x in frame {
        let s = x + coeff * s_prev - s_prev2;
        s_prev2 = s_prev;
        s_prev = s;
    }
    let power = s_prev * s_prev + s_prev2 * s_prev2 - coeff * s_prev * s_prev2;
    power / (frame.len() * frame.len()) as f32
}

/// Scale a vector to unit L2 norm in place (no-op on the zero vector)
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity between two vectors of equal length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}
