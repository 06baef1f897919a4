//! Core types and traits for the XENO voice pipeline
//!
//! This crate provides foundational types used across all other crates:
//! - Language and emotion enumerations
//! - Raw audio buffer type
//! - Error types
//! - Pluggable STT/TTS backend traits

pub mod audio;
pub mod emotion;
pub mod error;
pub mod language;
pub mod traits;

pub use audio::AudioBuffer;
pub use emotion::Emotion;
pub use error::{Error, Result};
pub use language::Language;
pub use traits::{SttBackend, SynthesisParams, TtsBackend};
