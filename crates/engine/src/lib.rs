//! Voice engine orchestrator
//!
//! [`VoiceEngine`] sequences the per-utterance pipeline (speaker
//! identification, transcription, wake check, emotion inference, context
//! update) and absorbs per-utterance failures so a capture loop can run
//! unattended. [`capture`] provides the producer/consumer boundary between
//! a blocking capture source and the engine's processing task.

pub mod capture;
pub mod engine;

pub use capture::{CaptureHandle, CaptureLoop, CaptureSource};
pub use engine::{ProcessOutcome, VoiceEngine};
