//! Wake word spotting over transcripts
//!
//! Matching is a case-insensitive substring containment test against every
//! registered phrase, in registration order. The stored phoneme breakdown
//! is advisory metadata for a future acoustic matcher; it plays no part in
//! detection.

use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;
use xeno_voice_core::AudioBuffer;

use crate::PipelineError;

/// Metadata for one registered wake phrase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeWordEntry {
    /// Lower-cased phrase matched against transcripts
    pub phrase: String,
    /// Approximate per-word grapheme breakdown (advisory)
    pub phonemes: Vec<Vec<String>>,
    /// Optional reference samples for a future acoustic matcher
    #[serde(skip)]
    pub samples: Vec<AudioBuffer>,
}

impl WakeWordEntry {
    fn new(phrase: String, samples: Vec<AudioBuffer>) -> Self {
        let phonemes = phrase
            .split_whitespace()
            .map(|word| word.graphemes(true).map(str::to_string).collect())
            .collect();
        Self {
            phrase,
            phonemes,
            samples,
        }
    }
}

/// Transcript-level wake word detector
///
/// Registration order is preserved; the first registered phrase contained
/// in a transcript wins.
#[derive(Debug, Clone, Default)]
pub struct WakeWordDetector {
    entries: Vec<WakeWordEntry>,
}

impl WakeWordDetector {
    /// Create a detector with an initial phrase set
    pub fn new(phrases: &[String]) -> Self {
        let mut detector = Self::default();
        for phrase in phrases {
            // Seed phrases come from config; silently skip blank ones.
            let _ = detector.add_custom_wake_word(phrase, Vec::new());
        }
        detector
    }

    /// Register a wake phrase, overwriting in place if already present
    pub fn add_custom_wake_word(
        &mut self,
        word: &str,
        samples: Vec<AudioBuffer>,
    ) -> Result<(), PipelineError> {
        let phrase = word.trim().to_lowercase();
        if phrase.is_empty() {
            return Err(PipelineError::WakeWord("wake word must be non-empty".into()));
        }

        let entry = WakeWordEntry::new(phrase.clone(), samples);
        if let Some(existing) = self.entries.iter_mut().find(|e| e.phrase == phrase) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
        debug!(phrase, total = self.entries.len(), "wake word registered");
        Ok(())
    }

    /// Check a transcript for any registered phrase
    pub fn detect(&self, transcript: &str) -> (bool, Option<String>) {
        if transcript.is_empty() {
            return (false, None);
        }
        let lower = transcript.to_lowercase();
        for entry in &self.entries {
            if lower.contains(&entry.phrase) {
                debug!(phrase = %entry.phrase, "wake word detected");
                return (true, Some(entry.phrase.clone()));
            }
        }
        (false, None)
    }

    /// Registered phrases in registration order
    pub fn phrases(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.phrase.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> WakeWordDetector {
        WakeWordDetector::new(&["xeno".to_string(), "hey xeno".to_string()])
    }

    #[test]
    fn test_detect_positive() {
        let (matched, phrase) = detector().detect("Hey XENO, lights on");
        assert!(matched);
        assert_eq!(phrase.as_deref(), Some("xeno"));
    }

    #[test]
    fn test_detect_negative() {
        assert_eq!(detector().detect("turn on the radio"), (false, None));
    }

    #[test]
    fn test_detect_empty_transcript() {
        assert_eq!(detector().detect(""), (false, None));
    }

    #[test]
    fn test_first_registered_wins() {
        let mut d = WakeWordDetector::default();
        d.add_custom_wake_word("computer please", Vec::new()).unwrap();
        d.add_custom_wake_word("computer", Vec::new()).unwrap();
        let (_, phrase) = d.detect("computer please do it");
        assert_eq!(phrase.as_deref(), Some("computer please"));
    }

    #[test]
    fn test_rejects_empty_word() {
        let mut d = detector();
        assert!(d.add_custom_wake_word("   ", Vec::new()).is_err());
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut d = detector();
        d.add_custom_wake_word("XENO", Vec::new()).unwrap();
        assert_eq!(d.phrases(), vec!["xeno", "hey xeno"]);
    }

    #[test]
    fn test_phoneme_breakdown() {
        let mut d = WakeWordDetector::default();
        d.add_custom_wake_word("hey xeno", Vec::new()).unwrap();
        let entry = &d.entries[0];
        assert_eq!(entry.phonemes.len(), 2);
        assert_eq!(entry.phonemes[0], vec!["h", "e", "y"]);
    }
}
