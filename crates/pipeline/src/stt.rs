//! Multi-language speech recognition with locale auto-detection

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xeno_voice_core::{AudioBuffer, Error, Language, Result, SttBackend};

/// Locales attempted, in order, when auto-detecting
const AUTO_DETECT_CANDIDATES: &[Language] = &[
    Language::EnUs,
    Language::EsEs,
    Language::FrFr,
    Language::DeDe,
    Language::ItIt,
    Language::PtBr,
    Language::ZhCn,
    Language::JaJp,
    Language::HiIn,
];

/// Confidence reported for a pinned-language recognition
const PINNED_CONFIDENCE: f32 = 0.9;
/// Confidence reported for the untagged fallback attempt
const FALLBACK_CONFIDENCE: f32 = 0.8;

/// One recognition result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub text: String,
    pub language: Language,
    pub confidence: f32,
}

/// Speech-to-text front end over a pluggable backend
///
/// Either pinned to one locale or auto-detecting (the default). Auto-detect
/// scans a fixed candidate list and keeps the highest-confidence transcript,
/// where per-attempt confidence is `min(len(text) / 100, 1.0)`.
pub struct MultiLanguageSpeechToText {
    backend: Arc<dyn SttBackend>,
    default_language: Language,
    pinned: RwLock<Option<Language>>,
}

impl MultiLanguageSpeechToText {
    pub fn new(backend: Arc<dyn SttBackend>, default_language: Language) -> Self {
        Self {
            backend,
            default_language,
            pinned: RwLock::new(None),
        }
    }

    /// Pin recognition to one locale, disabling auto-detect
    pub fn set_language(&self, language: Language) {
        *self.pinned.write() = Some(language);
    }

    /// Re-enable locale auto-detection
    pub fn enable_auto_detect(&self) {
        *self.pinned.write() = None;
    }

    /// Currently pinned locale, if any
    pub fn pinned_language(&self) -> Option<Language> {
        *self.pinned.read()
    }

    /// Recognize one utterance
    ///
    /// An explicit `language` argument wins over the pinned state. In
    /// pinned mode a no-speech result propagates as [`Error::NoSpeech`]
    /// for the caller to absorb. In auto-detect mode no-speech candidates
    /// just continue the scan; only service failures are hard errors.
    pub async fn recognize(
        &self,
        audio: &AudioBuffer,
        language: Option<Language>,
    ) -> Result<Recognition> {
        // Copy the pinned state out so no lock is held across an await.
        let effective = {
            let pinned = *self.pinned.read();
            language.or(pinned)
        };
        match effective {
            Some(lang) => {
                let text = self.backend.recognize(audio, Some(lang)).await?;
                Ok(Recognition {
                    text,
                    language: lang,
                    confidence: PINNED_CONFIDENCE,
                })
            }
            None => self.auto_detect(audio).await,
        }
    }

    async fn auto_detect(&self, audio: &AudioBuffer) -> Result<Recognition> {
        let mut best: Option<Recognition> = None;

        for &candidate in AUTO_DETECT_CANDIDATES {
            match self.backend.recognize(audio, Some(candidate)).await {
                Ok(text) => {
                    let confidence = (text.chars().count() as f32 / 100.0).min(1.0);
                    debug!(language = %candidate, confidence, "auto-detect candidate");
                    if best.as_ref().map_or(true, |b| confidence > b.confidence) {
                        best = Some(Recognition {
                            text,
                            language: candidate,
                            confidence,
                        });
                    }
                }
                Err(Error::NoSpeech) => continue,
                Err(err) => return Err(err),
            }
        }

        if let Some(best) = best {
            return Ok(best);
        }

        // Every candidate failed: one untagged retry, letting the provider
        // pick the locale.
        match self.backend.recognize(audio, None).await {
            Ok(text) => Ok(Recognition {
                text,
                language: self.default_language,
                confidence: FALLBACK_CONFIDENCE,
            }),
            Err(Error::NoSpeech) => {
                warn!("no speech understood in any locale");
                Ok(Recognition {
                    text: String::new(),
                    language: self.default_language,
                    confidence: 0.0,
                })
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that only understands one locale
    struct SingleLocaleStt {
        locale: Language,
        text: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SttBackend for SingleLocaleStt {
        async fn recognize(
            &self,
            _audio: &AudioBuffer,
            language: Option<Language>,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match language {
                Some(lang) if lang == self.locale => Ok(self.text.clone()),
                None => Ok(self.text.clone()),
                _ => Err(Error::NoSpeech),
            }
        }

        fn name(&self) -> &str {
            "single-locale-stt"
        }
    }

    struct DeafStt;

    #[async_trait]
    impl SttBackend for DeafStt {
        async fn recognize(
            &self,
            _audio: &AudioBuffer,
            _language: Option<Language>,
        ) -> Result<String> {
            Err(Error::NoSpeech)
        }

        fn name(&self) -> &str {
            "deaf-stt"
        }
    }

    struct BrokenStt;

    #[async_trait]
    impl SttBackend for BrokenStt {
        async fn recognize(
            &self,
            _audio: &AudioBuffer,
            _language: Option<Language>,
        ) -> Result<String> {
            Err(Error::service("stt", "connection refused"))
        }

        fn name(&self) -> &str {
            "broken-stt"
        }
    }

    fn buffer() -> AudioBuffer {
        AudioBuffer::new(vec![100; 16000], 16000)
    }

    #[tokio::test]
    async fn test_pinned_language() {
        let backend = Arc::new(SingleLocaleStt {
            locale: Language::FrFr,
            text: "bonjour tout le monde".to_string(),
            calls: AtomicUsize::new(0),
        });
        let stt = MultiLanguageSpeechToText::new(backend.clone(), Language::EnUs);
        stt.set_language(Language::FrFr);

        let result = stt.recognize(&buffer(), None).await.unwrap();
        assert_eq!(result.language, Language::FrFr);
        assert_eq!(result.confidence, 0.9);
        // Pinned mode performs exactly one backend call.
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_language_overrides_pin() {
        let backend = Arc::new(SingleLocaleStt {
            locale: Language::DeDe,
            text: "guten tag".to_string(),
            calls: AtomicUsize::new(0),
        });
        let stt = MultiLanguageSpeechToText::new(backend, Language::EnUs);
        stt.set_language(Language::FrFr);

        let result = stt
            .recognize(&buffer(), Some(Language::DeDe))
            .await
            .unwrap();
        assert_eq!(result.language, Language::DeDe);
    }

    #[tokio::test]
    async fn test_auto_detect_finds_locale() {
        let backend = Arc::new(SingleLocaleStt {
            locale: Language::JaJp,
            text: "こんにちは世界".to_string(),
            calls: AtomicUsize::new(0),
        });
        let stt = MultiLanguageSpeechToText::new(backend, Language::EnUs);

        let result = stt.recognize(&buffer(), None).await.unwrap();
        assert_eq!(result.language, Language::JaJp);
        assert!(result.confidence > 0.0);
        assert_eq!(result.text, "こんにちは世界");
    }

    #[tokio::test]
    async fn test_auto_detect_nothing_understood() {
        let stt = MultiLanguageSpeechToText::new(Arc::new(DeafStt), Language::EnUs);
        let result = stt.recognize(&buffer(), None).await.unwrap();
        assert_eq!(result.text, "");
        assert_eq!(result.language, Language::EnUs);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let stt = MultiLanguageSpeechToText::new(Arc::new(BrokenStt), Language::EnUs);
        let err = stt.recognize(&buffer(), None).await.unwrap_err();
        assert!(matches!(err, Error::Service { .. }));
    }

    #[tokio::test]
    async fn test_enable_auto_detect_unpins() {
        let stt = MultiLanguageSpeechToText::new(Arc::new(DeafStt), Language::EnUs);
        stt.set_language(Language::EsEs);
        assert_eq!(stt.pinned_language(), Some(Language::EsEs));
        stt.enable_auto_detect();
        assert_eq!(stt.pinned_language(), None);
    }

    #[tokio::test]
    async fn test_pinned_no_speech_propagates() {
        let stt = MultiLanguageSpeechToText::new(Arc::new(DeafStt), Language::EnUs);
        stt.set_language(Language::EnUs);
        assert!(stt
            .recognize(&buffer(), None)
            .await
            .unwrap_err()
            .is_no_speech());
    }
}
