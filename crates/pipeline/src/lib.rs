//! Voice pipeline components
//!
//! This crate provides the per-utterance processing components:
//! - Wake word spotting over transcripts
//! - Text and prosody emotion inference
//! - Multi-language speech recognition with locale auto-detection
//! - Multi-language synthesis with emotion-modulated voice parameters

pub mod emotion;
pub mod stt;
pub mod tts;
pub mod wake;

pub use emotion::{estimate_prosody, EmotionAnalyzer, ProsodyFeatures};
pub use stt::{MultiLanguageSpeechToText, Recognition};
pub use tts::{MultiLanguageTextToSpeech, VoiceSettings};
pub use wake::{WakeWordDetector, WakeWordEntry};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("wake word error: {0}")]
    WakeWord(String),
}

impl From<PipelineError> for xeno_voice_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::WakeWord(msg) => xeno_voice_core::Error::Config(msg),
        }
    }
}
