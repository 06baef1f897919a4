//! Configuration management for the voice pipeline
//!
//! Supports loading configuration from:
//! - TOML files
//! - Environment variables (XENO_VOICE_ prefix, `__` section separator)
//! - Built-in defaults when neither is present

pub mod settings;

pub use settings::{
    load_settings, BiometricsSettings, CaptureSettings, EngineSettings, Settings, WakeSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for xeno_voice_core::Error {
    fn from(err: ConfigError) -> Self {
        xeno_voice_core::Error::Config(err.to_string())
    }
}
