//! Offline end-to-end demo
//!
//! Runs the full pipeline with mock speech backends and a scripted capture
//! source: enrollment, wake word spotting, emotion inference, conversation
//! tracking, and a synthesized reply.
//!
//! ```sh
//! cargo run -p xeno-voice-engine --example offline_demo
//! ```

use std::f32::consts::PI;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use xeno_voice_config::Settings;
use xeno_voice_core::{
    AudioBuffer, Emotion, Language, Result, SttBackend, SynthesisParams, TtsBackend,
};
use xeno_voice_engine::{CaptureLoop, CaptureSource, VoiceEngine};

/// STT stand-in that "hears" a fixed script, one line per utterance
struct ScriptedStt {
    lines: Vec<&'static str>,
    cursor: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl SttBackend for ScriptedStt {
    async fn recognize(&self, _audio: &AudioBuffer, language: Option<Language>) -> Result<String> {
        match language {
            Some(Language::EnUs) | None => {
                let i = self
                    .cursor
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(self.lines[i % self.lines.len()].to_string())
            }
            _ => Err(xeno_voice_core::Error::NoSpeech),
        }
    }

    fn name(&self) -> &str {
        "scripted-stt"
    }
}

/// TTS stand-in that renders text as its UTF-8 bytes
struct ByteTts;

#[async_trait]
impl TtsBackend for ByteTts {
    async fn synthesize(&self, text: &str, params: &SynthesisParams) -> Result<Vec<u8>> {
        tracing::info!(voice = %params.voice_id, rate = params.rate, "synthesizing reply");
        Ok(text.as_bytes().to_vec())
    }

    fn name(&self) -> &str {
        "byte-tts"
    }
}

/// Capture source yielding a few synthetic utterances, then silence
struct SyntheticMic {
    remaining: usize,
}

impl CaptureSource for SyntheticMic {
    fn capture(&mut self) -> Result<Option<AudioBuffer>> {
        if self.remaining == 0 {
            std::thread::sleep(std::time::Duration::from_millis(20));
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(tone(300.0, 0.5)))
    }
}

fn tone(freq: f32, secs: f32) -> AudioBuffer {
    let sample_rate = 16000u32;
    let n = (secs * sample_rate as f32) as usize;
    let samples: Vec<i16> = (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            ((2.0 * PI * freq * t).sin() * 12000.0) as i16
        })
        .collect();
    AudioBuffer::new(samples, sample_rate)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = Settings::default();
    let capture_settings = settings.capture.clone();

    let stt = Arc::new(ScriptedStt {
        lines: vec![
            "Hey XENO turn on the lights",
            "I am so happy you got that working",
            "remind me tomorrow morning to call John Smith",
        ],
        cursor: std::sync::atomic::AtomicUsize::new(0),
    });
    let engine = Arc::new(VoiceEngine::new(settings, stt, Arc::new(ByteTts))?);
    engine.initialize();

    engine
        .enroll_user("demo-user", &[tone(300.0, 0.5)])
        .context("enrollment failed")?;

    let (handle, mut rx) = CaptureLoop::spawn(SyntheticMic { remaining: 3 }, capture_settings);

    for _ in 0..3 {
        let buffer = rx.recv().await.context("capture channel closed")?;
        let outcome = engine.process_audio(&buffer).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);

        if outcome.wake_word_detected {
            let reply = engine
                .respond(
                    "Lights are on.",
                    outcome.user_id.as_deref(),
                    Emotion::Calm,
                    None,
                )
                .await?;
            println!("reply audio: {} bytes", reply.len());
        }
    }

    println!("summary: {}", engine.conversations().context_summary("demo-user"));

    handle.shutdown().await;
    engine.shutdown();
    Ok(())
}
