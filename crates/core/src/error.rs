//! Error types shared across the voice pipeline

use thiserror::Error;

/// Errors surfaced by the voice pipeline
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The backend heard audio but understood no speech. Not a failure at
    /// the engine boundary: it surfaces as an empty transcript.
    #[error("no speech recognized")]
    NoSpeech,

    /// Transport/auth failure talking to an STT/TTS backend. Hard error.
    #[error("{backend} service error: {message}")]
    Service { backend: String, message: String },

    /// Enrollment was called with zero samples
    #[error("enrollment requires at least one audio sample")]
    EmptyEnrollment,

    /// Degenerate audio input (empty buffer, zero sample rate, too short)
    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    /// Configuration loading or validation failure
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a service error for a named backend
    pub fn service(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Whether this error means "nothing understood" rather than a fault
    pub fn is_no_speech(&self) -> bool {
        matches!(self, Self::NoSpeech)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_display() {
        let err = Error::service("stt", "connection refused");
        assert_eq!(err.to_string(), "stt service error: connection refused");
    }

    #[test]
    fn test_no_speech_classification() {
        assert!(Error::NoSpeech.is_no_speech());
        assert!(!Error::EmptyEnrollment.is_no_speech());
    }
}
