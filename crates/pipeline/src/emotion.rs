//! Emotion inference from transcripts and prosody
//!
//! Text scoring counts keyword-list hits per emotion; prosody rules are a
//! fixed-priority threshold cascade. When both signals are available and
//! the prosody verdict is non-neutral, prosody wins.

use serde::{Deserialize, Serialize};
use tracing::debug;
use xeno_voice_core::{AudioBuffer, Emotion};

/// Keyword lists per emotion, in registration order. Ties in text scoring
/// go to the earlier entry.
const KEYWORDS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Happy,
        &[
            "happy", "great", "wonderful", "love", "excellent", "awesome", "glad", "delighted",
        ],
    ),
    (
        Emotion::Sad,
        &[
            "sad", "unhappy", "depressed", "miserable", "unfortunate", "crying", "heartbroken",
        ],
    ),
    (
        Emotion::Angry,
        &["angry", "furious", "mad", "hate", "terrible", "awful", "outraged"],
    ),
    (
        Emotion::Excited,
        &["excited", "thrilled", "amazing", "incredible", "fantastic", "wow"],
    ),
    (
        Emotion::Frustrated,
        &["frustrated", "annoyed", "stuck", "fed up", "tired of", "struggling"],
    ),
    (
        Emotion::Confused,
        &[
            "confused",
            "don't understand",
            "unclear",
            "puzzled",
            "lost",
            "what do you mean",
        ],
    ),
    (
        Emotion::Calm,
        &["calm", "okay", "fine", "alright", "relaxed", "peaceful"],
    ),
];

/// Prosody features normalized to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProsodyFeatures {
    pub pitch: f32,
    pub energy: f32,
    pub tempo: f32,
}

/// Text + prosody emotion analyzer
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionAnalyzer;

impl EmotionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Score the transcript against every keyword list
    ///
    /// Highest nonzero score wins. With no keyword hits, punctuation
    /// decides: two or more `!` means excited, two or more `?` means
    /// confused, otherwise neutral.
    pub fn analyze_text(&self, text: &str) -> Emotion {
        let lower = text.to_lowercase();

        let mut best = Emotion::Neutral;
        let mut best_score = 0usize;
        for (emotion, keywords) in KEYWORDS {
            let score = keywords.iter().filter(|k| lower.contains(*k)).count();
            if score > best_score {
                best_score = score;
                best = *emotion;
            }
        }
        if best_score > 0 {
            return best;
        }

        if text.matches('!').count() >= 2 {
            Emotion::Excited
        } else if text.matches('?').count() >= 2 {
            Emotion::Confused
        } else {
            Emotion::Neutral
        }
    }

    /// Threshold cascade over prosody features, evaluated in fixed order
    pub fn analyze_audio(&self, features: ProsodyFeatures) -> Emotion {
        let ProsodyFeatures {
            pitch,
            energy,
            tempo,
        } = features;

        if pitch > 0.7 && energy > 0.7 {
            Emotion::Excited
        } else if pitch < 0.3 && energy < 0.3 {
            Emotion::Sad
        } else if energy > 0.8 && tempo > 0.7 {
            Emotion::Angry
        } else if pitch > 0.4 && pitch < 0.6 && energy > 0.4 && energy < 0.6 {
            Emotion::Calm
        } else {
            Emotion::Neutral
        }
    }

    /// Combined verdict: prosody overrides the text result when it
    /// disagrees non-trivially (i.e. is non-neutral).
    pub fn analyze(&self, text: &str, audio_features: Option<ProsodyFeatures>) -> Emotion {
        let from_text = self.analyze_text(text);
        let verdict = match audio_features {
            Some(features) => match self.analyze_audio(features) {
                Emotion::Neutral => from_text,
                from_audio => from_audio,
            },
            None => from_text,
        };
        debug!(%from_text, %verdict, "emotion analyzed");
        verdict
    }
}

/// Derive deterministic prosody proxies from raw audio
///
/// Pitch is approximated by zero-crossing rate, energy by RMS level, and
/// tempo by the rate of frame-energy onsets. All three are clamped to
/// [0, 1]; these are coarse proxies, not acoustic measurements.
pub fn estimate_prosody(audio: &AudioBuffer) -> ProsodyFeatures {
    let samples = audio.to_f32();
    if samples.is_empty() {
        return ProsodyFeatures {
            pitch: 0.0,
            energy: 0.0,
            tempo: 0.0,
        };
    }

    let rms = (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt();
    let energy = (rms * 5.0).min(1.0);

    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    let zcr = crossings as f32 / samples.len() as f32;
    let pitch = (zcr * 8.0).min(1.0);

    // Onset rate over 50ms frames.
    let frame_len = (audio.sample_rate() as usize / 20).max(1);
    let frame_rms: Vec<f32> = samples
        .chunks(frame_len)
        .map(|c| (c.iter().map(|s| s * s).sum::<f32>() / c.len() as f32).sqrt())
        .collect();
    let onsets = frame_rms
        .windows(2)
        .filter(|w| w[1] > w[0] * 1.5 && w[1] > 0.01)
        .count();
    let tempo = if frame_rms.len() > 1 {
        (onsets as f32 / (frame_rms.len() - 1) as f32 * 4.0).min(1.0)
    } else {
        0.0
    };

    ProsodyFeatures {
        pitch,
        energy,
        tempo,
    }
}
