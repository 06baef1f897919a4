//! Speaker enrollment, verification, and identification

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};
use xeno_voice_config::BiometricsSettings;
use xeno_voice_core::{AudioBuffer, Error, Result};

use crate::features::{cosine_similarity, l2_normalize, FeatureExtractor};
use crate::profile::VoiceProfile;

/// Voice biometrics component
///
/// Owns every [`VoiceProfile`]; all mutation goes through this type.
pub struct VoiceBiometrics {
    extractor: FeatureExtractor,
    settings: BiometricsSettings,
    profiles: RwLock<HashMap<String, VoiceProfile>>,
}

impl VoiceBiometrics {
    pub fn new(settings: BiometricsSettings) -> Result<Self> {
        Ok(Self {
            extractor: FeatureExtractor::new(settings.feature_dim)?,
            settings,
            profiles: RwLock::new(HashMap::new()),
        })
    }

    /// Extract an embedding for one utterance
    pub fn extract_features(&self, audio: &AudioBuffer) -> Result<Vec<f32>> {
        self.extractor.extract(audio)
    }

    /// Enroll a user from one or more samples, overwriting any prior profile
    ///
    /// Per-sample embeddings are averaged element-wise and re-normalized.
    pub fn enroll_user(&self, user_id: &str, samples: &[AudioBuffer]) -> Result<VoiceProfile> {
        if samples.is_empty() {
            return Err(Error::EmptyEnrollment);
        }

        let dim = self.extractor.dim();
        let mut mean = vec![0.0f32; dim];
        for sample in samples {
            let features = self.extractor.extract(sample)?;
            for (m, f) in mean.iter_mut().zip(&features) {
                *m += f;
            }
        }
        for m in mean.iter_mut() {
            *m /= samples.len() as f32;
        }
        l2_normalize(&mut mean);

        let profile = VoiceProfile::new(
            user_id,
            mean,
            samples.len(),
            self.settings.verification_threshold,
        );
        self.profiles
            .write()
            .insert(user_id.to_string(), profile.clone());

        info!(user_id, samples = samples.len(), "speaker enrolled");
        Ok(profile)
    }

    /// Blend a new sample into an existing profile via exponential moving
    /// average, then re-normalize. No-op (returns false) for unknown users.
    pub fn update_profile(&self, user_id: &str, sample: &AudioBuffer) -> Result<bool> {
        let features = self.extractor.extract(sample)?;
        let alpha = self.settings.learning_rate;

        let mut profiles = self.profiles.write();
        let Some(profile) = profiles.get_mut(user_id) else {
            debug!(user_id, "update skipped, no profile");
            return Ok(false);
        };

        for (old, new) in profile.features.iter_mut().zip(&features) {
            *old = (1.0 - alpha) * *old + alpha * new;
        }
        l2_normalize(&mut profile.features);
        profile.sample_count += 1;
        profile.last_updated_at = Utc::now();

        debug!(user_id, sample_count = profile.sample_count, "profile updated");
        Ok(true)
    }

    /// Verify a claimed identity against that user's stored profile
    ///
    /// Returns `(false, 0.0)` when the user has no profile.
    pub fn verify_speaker(&self, user_id: &str, sample: &AudioBuffer) -> Result<(bool, f32)> {
        let profiles = self.profiles.read();
        let Some(profile) = profiles.get(user_id) else {
            return Ok((false, 0.0));
        };

        let features = self.extractor.extract(sample)?;
        let score = cosine_similarity(&profile.features, &features);
        let verified = score >= profile.confidence_threshold;

        debug!(user_id, score, verified, "speaker verification");
        Ok((verified, score))
    }

    /// Find the best-matching enrolled speaker
    ///
    /// Names a user only when the best score clears the identification
    /// floor; otherwise returns `(None, best_score)`. The floor is fixed
    /// per component, not per profile.
    pub fn identify_speaker(&self, sample: &AudioBuffer) -> Result<(Option<String>, f32)> {
        let profiles = self.profiles.read();
        if profiles.is_empty() {
            return Ok((None, 0.0));
        }

        let features = self.extractor.extract(sample)?;
        let mut best_id: Option<&str> = None;
        let mut best_score = f32::NEG_INFINITY;
        for (user_id, profile) in profiles.iter() {
            let score = cosine_similarity(&profile.features, &features);
            if score > best_score {
                best_score = score;
                best_id = Some(user_id);
            }
        }

        if best_score >= self.settings.identification_floor {
            let id = best_id.map(String::from);
            debug!(user_id = ?id, score = best_score, "speaker identified");
            Ok((id, best_score))
        } else {
            debug!(score = best_score, "no speaker above identification floor");
            Ok((None, best_score))
        }
    }

    /// Get a snapshot of an enrolled profile
    pub fn profile(&self, user_id: &str) -> Option<VoiceProfile> {
        self.profiles.read().get(user_id).cloned()
    }

    /// List enrolled user ids
    pub fn enrolled_users(&self) -> Vec<String> {
        self.profiles.read().keys().cloned().collect()
    }

    /// Number of enrolled profiles
    pub fn profile_count(&self) -> usize {
        self.profiles.read().len()
    }
}
