//! Stored voice profile for an enrolled speaker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An enrolled speaker's voiceprint
///
/// Owned exclusively by [`crate::VoiceBiometrics`]: created on enrollment
/// and blended in place by profile updates, never replaced wholesale.
/// `features` is always unit-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Unique user id
    pub user_id: String,
    /// Unit-normalized embedding
    pub features: Vec<f32>,
    /// Number of samples blended into this profile (>= 1)
    pub sample_count: usize,
    /// Similarity required for verification against this profile
    pub confidence_threshold: f32,
    /// When the profile was enrolled
    pub created_at: DateTime<Utc>,
    /// When the profile was last blended with a new sample
    pub last_updated_at: DateTime<Utc>,
}

impl VoiceProfile {
    pub fn new(
        user_id: impl Into<String>,
        features: Vec<f32>,
        sample_count: usize,
        confidence_threshold: f32,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            features,
            sample_count,
            confidence_threshold,
            created_at: now,
            last_updated_at: now,
        }
    }
}
