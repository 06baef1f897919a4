//! Settings for the engine, biometrics, capture loop, and wake words

use serde::{Deserialize, Serialize};
use xeno_voice_core::Language;

use crate::ConfigError;

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub biometrics: BiometricsSettings,
    #[serde(default)]
    pub capture: CaptureSettings,
    #[serde(default)]
    pub wake: WakeSettings,
}

/// Engine and conversation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Default recognition/synthesis language
    #[serde(default)]
    pub default_language: Language,
    /// Messages retained per conversation (FIFO eviction)
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Maximum tracked user contexts (LRU eviction)
    #[serde(default = "default_max_users")]
    pub max_users: usize,
    /// Idle seconds before a context becomes evictable
    #[serde(default = "default_context_ttl")]
    pub context_ttl_secs: u64,
}

fn default_history_cap() -> usize {
    10
}

fn default_max_users() -> usize {
    256
}

fn default_context_ttl() -> u64 {
    3600
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            history_cap: default_history_cap(),
            max_users: default_max_users(),
            context_ttl_secs: default_context_ttl(),
        }
    }
}

/// Speaker biometrics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiometricsSettings {
    /// Feature vector dimension
    #[serde(default = "default_feature_dim")]
    pub feature_dim: usize,
    /// Per-profile verification threshold
    #[serde(default = "default_verification_threshold")]
    pub verification_threshold: f32,
    /// Identification floor: minimum best-match similarity before
    /// identify names a user. Independent of the verification threshold.
    #[serde(default = "default_identification_floor")]
    pub identification_floor: f32,
    /// EMA learning rate for profile updates
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
}

fn default_feature_dim() -> usize {
    128
}

fn default_verification_threshold() -> f32 {
    0.85
}

fn default_identification_floor() -> f32 {
    0.70
}

fn default_learning_rate() -> f32 {
    0.1
}

impl Default for BiometricsSettings {
    fn default() -> Self {
        Self {
            feature_dim: default_feature_dim(),
            verification_threshold: default_verification_threshold(),
            identification_floor: default_identification_floor(),
            learning_rate: default_learning_rate(),
        }
    }
}

/// Capture loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Seconds to wait for speech to start per listen attempt
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: u64,
    /// Maximum seconds per captured phrase
    #[serde(default = "default_phrase_limit")]
    pub phrase_limit_secs: u64,
    /// Bounded channel capacity between capture task and engine
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_listen_timeout() -> u64 {
    5
}

fn default_phrase_limit() -> u64 {
    10
}

fn default_channel_capacity() -> usize {
    8
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            listen_timeout_secs: default_listen_timeout(),
            phrase_limit_secs: default_phrase_limit(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Wake word settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeSettings {
    /// Initial wake phrases, lower-cased on registration
    #[serde(default = "default_wake_phrases")]
    pub phrases: Vec<String>,
}

fn default_wake_phrases() -> Vec<String> {
    vec!["xeno".to_string(), "hey xeno".to_string()]
}

impl Default for WakeSettings {
    fn default() -> Self {
        Self {
            phrases: default_wake_phrases(),
        }
    }
}

impl Settings {
    /// Validate ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |field: &str, v: f32| -> Result<(), ConfigError> {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("{v} is outside [0, 1]"),
                });
            }
            Ok(())
        };
        unit(
            "biometrics.verification_threshold",
            self.biometrics.verification_threshold,
        )?;
        unit(
            "biometrics.identification_floor",
            self.biometrics.identification_floor,
        )?;
        unit("biometrics.learning_rate", self.biometrics.learning_rate)?;

        if self.biometrics.feature_dim == 0 {
            return Err(ConfigError::InvalidValue {
                field: "biometrics.feature_dim".to_string(),
                message: "must be nonzero".to_string(),
            });
        }
        if self.engine.history_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.history_cap".to_string(),
                message: "must be nonzero".to_string(),
            });
        }
        if self.capture.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "capture.channel_capacity".to_string(),
                message: "must be nonzero".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from an optional TOML file plus environment overrides
pub fn load_settings(path: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !std::path::Path::new(path).exists() {
            return Err(ConfigError::FileNotFound(path.to_string()));
        }
        builder = builder.add_source(config::File::with_name(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("XENO_VOICE")
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;

    tracing::debug!(
        history_cap = settings.engine.history_cap,
        feature_dim = settings.biometrics.feature_dim,
        "settings loaded"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.engine.history_cap, 10);
        assert_eq!(s.biometrics.feature_dim, 128);
        assert_eq!(s.biometrics.verification_threshold, 0.85);
        assert_eq!(s.biometrics.identification_floor, 0.70);
        assert_eq!(s.capture.listen_timeout_secs, 5);
        assert_eq!(s.capture.phrase_limit_secs, 10);
        assert_eq!(s.wake.phrases, vec!["xeno", "hey xeno"]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let s: Settings = toml::from_str(
            r#"
            [engine]
            history_cap = 4

            [biometrics]
            verification_threshold = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(s.engine.history_cap, 4);
        assert_eq!(s.biometrics.verification_threshold, 0.9);
        assert_eq!(s.biometrics.identification_floor, 0.70);
    }

    #[test]
    fn test_validation_rejects_bad_threshold() {
        let mut s = Settings::default();
        s.biometrics.verification_threshold = 1.5;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_settings(Some("/nonexistent/xeno.toml")),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
