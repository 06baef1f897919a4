//! The voice engine: per-utterance stage sequencing

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use xeno_voice_biometrics::{VoiceBiometrics, VoiceProfile};
use xeno_voice_config::Settings;
use xeno_voice_conversation::{ConversationManager, ManagerConfig, MessageRole};
use xeno_voice_core::{AudioBuffer, Emotion, Error, Language, Result, SttBackend, TtsBackend};
use xeno_voice_pipeline::{
    estimate_prosody, EmotionAnalyzer, MultiLanguageSpeechToText, MultiLanguageTextToSpeech,
    WakeWordDetector,
};

/// Pipeline stages for one utterance, run in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Identifying,
    Transcribing,
    WakeCheck,
    EmotionAnalysis,
    ContextUpdate,
    Done,
}

/// Structured result of one `process_audio` call
///
/// Identity-dependent fields (`entities`, `topic_changed`,
/// `context_summary`) are present only when a speaker was identified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub success: bool,
    pub text: String,
    pub language: Language,
    pub emotion: Emotion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub confidence: f32,
    pub wake_word_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_changed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessOutcome {
    fn empty(language: Language) -> Self {
        Self {
            success: true,
            text: String::new(),
            language,
            emotion: Emotion::Neutral,
            user_id: None,
            confidence: 0.0,
            wake_word_detected: false,
            wake_word: None,
            entities: None,
            topic_changed: None,
            context_summary: None,
            error: None,
        }
    }

    fn failed(language: Language, message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            ..Self::empty(language)
        }
    }
}

/// Top-level orchestrator over the pipeline components
///
/// Explicitly constructed with its backends; owns all mutable pipeline
/// state. All profile and context mutation happens inside engine-owned
/// calls, so a single consumer task needs no further synchronization.
pub struct VoiceEngine {
    settings: Settings,
    active: AtomicBool,
    wake: RwLock<WakeWordDetector>,
    analyzer: EmotionAnalyzer,
    biometrics: VoiceBiometrics,
    stt: MultiLanguageSpeechToText,
    tts: MultiLanguageTextToSpeech,
    conversations: ConversationManager,
}

impl VoiceEngine {
    pub fn new(
        settings: Settings,
        stt_backend: Arc<dyn SttBackend>,
        tts_backend: Arc<dyn TtsBackend>,
    ) -> Result<Self> {
        let default_language = settings.engine.default_language;
        Ok(Self {
            active: AtomicBool::new(false),
            wake: RwLock::new(WakeWordDetector::new(&settings.wake.phrases)),
            analyzer: EmotionAnalyzer::new(),
            biometrics: VoiceBiometrics::new(settings.biometrics.clone())?,
            stt: MultiLanguageSpeechToText::new(stt_backend, default_language),
            tts: MultiLanguageTextToSpeech::new(tts_backend, default_language),
            conversations: ConversationManager::new(ManagerConfig {
                history_cap: settings.engine.history_cap,
                max_users: settings.engine.max_users,
                context_ttl: Duration::from_secs(settings.engine.context_ttl_secs),
                default_language,
            }),
            settings,
        })
    }

    /// Mark the engine active. Idempotent.
    pub fn initialize(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            info!(
                wake_phrases = ?self.wake.read().phrases(),
                language = %self.settings.engine.default_language,
                "voice engine initialized"
            );
        }
    }

    /// Mark the engine inactive. Idempotent; in-flight calls finish
    /// naturally.
    pub fn shutdown(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("voice engine shut down");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Run the stage sequence over one captured utterance
    ///
    /// Never panics or propagates: hard errors are converted into a
    /// `success = false` outcome so the capture loop survives a bad
    /// utterance.
    pub async fn process_audio(&self, audio: &AudioBuffer) -> ProcessOutcome {
        let default_language = self.settings.engine.default_language;
        if !self.is_active() {
            return ProcessOutcome::failed(default_language, "engine is not active".to_string());
        }
        if let Err(err) = audio.validate() {
            return ProcessOutcome::failed(default_language, err.to_string());
        }

        let mut outcome = ProcessOutcome::empty(default_language);
        let mut stage = Stage::Identifying;

        loop {
            stage = match stage {
                Stage::Identifying => {
                    match self.biometrics.identify_speaker(audio) {
                        Ok((user_id, score)) => {
                            debug!(user_id = ?user_id, score, "identification stage");
                            outcome.user_id = user_id;
                        }
                        // Identification trouble is not fatal: the
                        // utterance continues unattributed.
                        Err(err) => warn!(%err, "identification skipped"),
                    }
                    Stage::Transcribing
                }
                Stage::Transcribing => match self.stt.recognize(audio, None).await {
                    Ok(recognition) => {
                        outcome.text = recognition.text;
                        outcome.language = recognition.language;
                        outcome.confidence = recognition.confidence;
                        if outcome.text.is_empty() {
                            Stage::Done
                        } else {
                            Stage::WakeCheck
                        }
                    }
                    Err(Error::NoSpeech) => Stage::Done,
                    Err(err) => {
                        warn!(%err, "transcription failed");
                        outcome.success = false;
                        outcome.error = Some(err.to_string());
                        Stage::Done
                    }
                },
                Stage::WakeCheck => {
                    let (detected, phrase) = self.wake.read().detect(&outcome.text);
                    outcome.wake_word_detected = detected;
                    outcome.wake_word = phrase;
                    Stage::EmotionAnalysis
                }
                Stage::EmotionAnalysis => {
                    let prosody = estimate_prosody(audio);
                    outcome.emotion = self.analyzer.analyze(&outcome.text, Some(prosody));
                    Stage::ContextUpdate
                }
                Stage::ContextUpdate => {
                    if let Some(user_id) = outcome.user_id.clone() {
                        let changed = self.conversations.detect_topic_change(&user_id, &outcome.text);
                        if changed {
                            self.conversations
                                .set_topic(&user_id, derive_topic(&outcome.text));
                        }
                        let entities = self.conversations.extract_entities(&user_id, &outcome.text);
                        self.conversations.add_message(
                            &user_id,
                            MessageRole::User,
                            &outcome.text,
                            outcome.emotion,
                        );
                        outcome.topic_changed = Some(changed);
                        outcome.entities = Some(entities);
                        outcome.context_summary =
                            Some(self.conversations.context_summary(&user_id));
                    }
                    Stage::Done
                }
                Stage::Done => break,
            };
        }

        outcome
    }

    /// Synthesize a reply, recording it as an assistant turn when the
    /// target user is known
    pub async fn respond(
        &self,
        text: &str,
        user_id: Option<&str>,
        emotion: Emotion,
        language: Option<Language>,
    ) -> Result<Vec<u8>> {
        if let Some(user_id) = user_id {
            self.conversations
                .add_message(user_id, MessageRole::Assistant, text, emotion);
        }
        self.tts.speak(text, language, emotion).await
    }

    /// Enroll a speaker from raw samples
    pub fn enroll_user(&self, user_id: &str, samples: &[AudioBuffer]) -> Result<VoiceProfile> {
        self.biometrics.enroll_user(user_id, samples)
    }

    /// Blend one more sample into an enrolled profile
    pub fn update_profile(&self, user_id: &str, sample: &AudioBuffer) -> Result<bool> {
        self.biometrics.update_profile(user_id, sample)
    }

    /// Register an additional wake phrase
    pub fn add_custom_wake_word(&self, word: &str) -> Result<()> {
        self.wake
            .write()
            .add_custom_wake_word(word, Vec::new())
            .map_err(Into::into)
    }

    /// Pin recognition and default synthesis to one language
    pub fn set_language(&self, language: Language) {
        self.stt.set_language(language);
        self.tts.set_language(language);
    }

    /// Conversation state, for the presentation collaborator
    pub fn conversations(&self) -> &ConversationManager {
        &self.conversations
    }

    /// Speaker profiles, for the presentation collaborator
    pub fn biometrics(&self) -> &VoiceBiometrics {
        &self.biometrics
    }
}

/// Short topic label: the first few content words of an utterance
fn derive_topic(text: &str) -> String {
    text.split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
