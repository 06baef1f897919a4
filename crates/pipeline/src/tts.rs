//! Multi-language synthesis with emotion-modulated voice parameters
//!
//! The contract here is the parameter derivation: each language has a base
//! voice (rate 1.0, pitch 0.0) and the requested emotion shifts rate and
//! pitch before the backend renders audio. The codec is a backend concern.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use xeno_voice_core::{Emotion, Language, Result, SynthesisParams, TtsBackend};

/// Base voice configuration for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub voice_id: String,
    /// Base speech rate multiplier
    pub rate: f32,
    /// Base pitch offset in semitones
    pub pitch: f32,
}

impl VoiceSettings {
    fn default_for(language: Language) -> Self {
        Self {
            voice_id: format!("{}-standard-1", language.tag()),
            rate: 1.0,
            pitch: 0.0,
        }
    }
}

/// Text-to-speech front end over a pluggable backend
pub struct MultiLanguageTextToSpeech {
    backend: Arc<dyn TtsBackend>,
    voices: HashMap<Language, VoiceSettings>,
    default_language: RwLock<Language>,
}

impl MultiLanguageTextToSpeech {
    pub fn new(backend: Arc<dyn TtsBackend>, default_language: Language) -> Self {
        let voices = Language::all()
            .iter()
            .map(|&lang| (lang, VoiceSettings::default_for(lang)))
            .collect();
        Self {
            backend,
            voices,
            default_language: RwLock::new(default_language),
        }
    }

    /// Change the default output language
    pub fn set_language(&self, language: Language) {
        *self.default_language.write() = language;
    }

    pub fn default_language(&self) -> Language {
        *self.default_language.read()
    }

    /// Replace the base voice for a language
    pub fn set_voice(&mut self, language: Language, settings: VoiceSettings) {
        self.voices.insert(language, settings);
    }

    /// Base voice for a language
    pub fn voice(&self, language: Language) -> &VoiceSettings {
        &self.voices[&language]
    }

    /// Derive the synthesis parameters for one request
    pub fn derive_params(&self, language: Language, emotion: Emotion) -> SynthesisParams {
        let base = self.voice(language);
        let (rate_factor, pitch_delta) = match emotion {
            Emotion::Excited => (1.2, 2.0),
            Emotion::Sad => (0.8, -2.0),
            Emotion::Angry => (1.1, 1.0),
            Emotion::Calm => (0.9, -0.5),
            _ => (1.0, 0.0),
        };
        SynthesisParams {
            voice_id: base.voice_id.clone(),
            language,
            rate: base.rate * rate_factor,
            pitch: base.pitch + pitch_delta,
        }
    }

    /// Synthesize text into opaque audio bytes
    pub async fn speak(
        &self,
        text: &str,
        language: Option<Language>,
        emotion: Emotion,
    ) -> Result<Vec<u8>> {
        let language = language.unwrap_or_else(|| self.default_language());
        let params = self.derive_params(language, emotion);
        debug!(
            language = %language,
            emotion = %emotion,
            rate = params.rate,
            pitch = params.pitch,
            "synthesizing"
        );
        self.backend.synthesize(text, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Backend that echoes the derived parameters back as JSON bytes
    struct EchoTts;

    #[async_trait]
    impl TtsBackend for EchoTts {
        async fn synthesize(&self, text: &str, params: &SynthesisParams) -> Result<Vec<u8>> {
            let payload = serde_json::json!({ "text": text, "params": params });
            Ok(payload.to_string().into_bytes())
        }

        fn name(&self) -> &str {
            "echo-tts"
        }
    }

    fn tts() -> MultiLanguageTextToSpeech {
        MultiLanguageTextToSpeech::new(Arc::new(EchoTts), Language::EnUs)
    }

    #[test]
    fn test_excited_raises_rate() {
        let tts = tts();
        let base = tts.voice(Language::EnUs).rate;
        let params = tts.derive_params(Language::EnUs, Emotion::Excited);
        assert!(params.rate > base);
        assert_eq!(params.pitch, 2.0);
    }

    #[test]
    fn test_sad_lowers_rate() {
        let tts = tts();
        let base = tts.voice(Language::EnUs).rate;
        let params = tts.derive_params(Language::EnUs, Emotion::Sad);
        assert!(params.rate < base);
        assert_eq!(params.pitch, -2.0);
    }

    #[test]
    fn test_neutral_keeps_base() {
        let tts = tts();
        let params = tts.derive_params(Language::FrFr, Emotion::Neutral);
        assert_eq!(params.rate, 1.0);
        assert_eq!(params.pitch, 0.0);
        assert_eq!(params.voice_id, "fr-FR-standard-1");
    }

    #[test]
    fn test_every_language_has_a_voice() {
        let tts = tts();
        for &lang in Language::all() {
            assert!(!tts.voice(lang).voice_id.is_empty());
        }
    }

    #[tokio::test]
    async fn test_speak_uses_default_language() {
        let tts = tts();
        tts.set_language(Language::DeDe);
        let bytes = tts.speak("hallo", None, Emotion::Neutral).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["params"]["language"], "de-de");
    }

    #[tokio::test]
    async fn test_speak_explicit_language() {
        let tts = tts();
        let bytes = tts
            .speak("hola", Some(Language::EsEs), Emotion::Calm)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["params"]["language"], "es-es");
        assert!((payload["params"]["rate"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }
}
