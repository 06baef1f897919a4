//! Pluggable speech backend traits
//!
//! The recognition and synthesis providers are replaceable: the pipeline
//! only depends on these traits, never on a concrete cloud/local client.
//!
//! # Example
//!
//! ```ignore
//! let stt: Arc<dyn SttBackend> = Arc::new(CloudStt::new(config));
//! let text = stt.recognize(&buffer, Some(Language::EnUs)).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audio::AudioBuffer;
use crate::error::Result;
use crate::language::Language;

/// Speech-to-Text backend
///
/// Implementations return [`crate::Error::NoSpeech`] when audio was heard
/// but no speech was understood, and [`crate::Error::Service`] for
/// transport/auth failures. The distinction matters: the pipeline absorbs
/// the former and propagates the latter.
#[async_trait]
pub trait SttBackend: Send + Sync + 'static {
    /// Recognize one utterance
    ///
    /// # Arguments
    /// * `audio` - Captured utterance
    /// * `language` - Locale hint; `None` lets the provider decide
    async fn recognize(&self, audio: &AudioBuffer, language: Option<Language>) -> Result<String>;

    /// Backend name for logging and error messages
    fn name(&self) -> &str;
}

/// Derived synthesis parameters handed to a TTS backend
///
/// The pipeline derives rate and pitch from the base voice configuration
/// and the requested emotion; the backend only renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// Voice identifier for the target language
    pub voice_id: String,
    /// Target language
    pub language: Language,
    /// Speech rate multiplier (1.0 = base)
    pub rate: f32,
    /// Pitch offset in semitones (0.0 = base)
    pub pitch: f32,
}

/// Text-to-Speech backend
#[async_trait]
pub trait TtsBackend: Send + Sync + 'static {
    /// Synthesize text into opaque audio bytes (encoding is backend-defined)
    async fn synthesize(&self, text: &str, params: &SynthesisParams) -> Result<Vec<u8>>;

    /// Backend name for logging and error messages
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct MockStt;

    #[async_trait]
    impl SttBackend for MockStt {
        async fn recognize(
            &self,
            audio: &AudioBuffer,
            _language: Option<Language>,
        ) -> Result<String> {
            if audio.is_empty() {
                return Err(Error::NoSpeech);
            }
            Ok("hello world".to_string())
        }

        fn name(&self) -> &str {
            "mock-stt"
        }
    }

    #[tokio::test]
    async fn test_mock_backend() {
        let stt = MockStt;
        let buf = AudioBuffer::new(vec![1, 2, 3], 16000);
        assert_eq!(stt.recognize(&buf, None).await.unwrap(), "hello world");

        let empty = AudioBuffer::new(vec![], 16000);
        assert!(stt.recognize(&empty, None).await.unwrap_err().is_no_speech());
    }
}
