//! Speaker biometrics: voiceprint extraction and matching
//!
//! The pipeline processes audio in two stages:
//!
//! 1. [`FeatureExtractor::extract`]: PCM16 utterance -> unit-normalized
//!    spectral embedding
//! 2. [`VoiceBiometrics`]: embedding -> enrollment, moving-average profile
//!    updates, cosine-similarity verification and identification
//!
//! Verification compares against one user's profile at that profile's own
//! threshold; identification scans every profile and names a user only when
//! the best score clears a fixed floor.

pub mod biometrics;
pub mod features;
pub mod profile;

pub use biometrics::VoiceBiometrics;
pub use features::{cosine_similarity, FeatureExtractor};
pub use profile::VoiceProfile;
