//! Emotion tags attached to utterances and conversation turns

use serde::{Deserialize, Serialize};

/// Emotion inferred from an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Excited,
    Frustrated,
    Confused,
    Calm,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Excited => "excited",
            Self::Frustrated => "frustrated",
            Self::Confused => "confused",
            Self::Calm => "calm",
        }
    }

    /// Get all emotion tags
    pub fn all() -> &'static [Emotion] {
        &[
            Self::Neutral,
            Self::Happy,
            Self::Sad,
            Self::Angry,
            Self::Excited,
            Self::Frustrated,
            Self::Confused,
            Self::Calm,
        ]
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
