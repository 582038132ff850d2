//! # Editor Configuration
//!
//! TOML-backed settings, loaded once at startup. Defaults mirror the
//! constants the canvas shipped with; validation rejects values the
//! runtime cannot honor instead of silently clamping them.
//!
//! ```toml
//! [workers]
//! channel_capacity = 64
//!
//! [chain]
//! cycle_duration = 3.0
//!
//! [scene]
//! slow_batch_threshold_ms = 100
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside the range the runtime can honor.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Settings for the worker actors.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerSettings {
    /// Bounded capacity of each request/reply queue.
    pub channel_capacity: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

/// Settings for the chain-animation clock.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ChainSettings {
    /// Cycle duration in seconds.
    pub cycle_duration: f32,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            cycle_duration: aurafx_workers::DEFAULT_CYCLE_DURATION,
        }
    }
}

/// Settings for the scene kernel.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SceneSettings {
    /// Batches slower than this many milliseconds are logged.
    pub slow_batch_threshold_ms: u64,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            slow_batch_threshold_ms: 100,
        }
    }
}

impl SceneSettings {
    /// The slow-batch threshold as a [`Duration`].
    #[must_use]
    pub const fn slow_batch_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_batch_threshold_ms)
    }
}

/// Editor core configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Worker actor settings.
    pub workers: WorkerSettings,
    /// Chain-animation settings.
    pub chain: ChainSettings,
    /// Scene kernel settings.
    pub scene: SceneSettings,
}

impl EditorConfig {
    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read, and every error
    /// [`EditorConfig::from_toml_str`] can produce.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates config TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or unknown fields,
    /// [`ConfigError::Invalid`] on values the runtime cannot honor.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the runtime cannot honor.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.workers.channel_capacity == 0 {
            return Err(ConfigError::Invalid(String::from(
                "workers.channel_capacity must be at least 1",
            )));
        }
        if !(self.chain.cycle_duration.is_finite() && self.chain.cycle_duration > 0.0) {
            return Err(ConfigError::Invalid(String::from(
                "chain.cycle_duration must be a positive number of seconds",
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_toml() {
        let parsed = EditorConfig::from_toml_str(
            r#"
            [workers]
            channel_capacity = 64

            [chain]
            cycle_duration = 3.0

            [scene]
            slow_batch_threshold_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(parsed, EditorConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed = EditorConfig::from_toml_str(
            r#"
            [chain]
            cycle_duration = 1.5
            "#,
        )
        .unwrap();

        assert!((parsed.chain.cycle_duration - 1.5).abs() < f32::EPSILON);
        assert_eq!(parsed.workers, WorkerSettings::default());
        assert_eq!(parsed.scene, SceneSettings::default());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = EditorConfig::from_toml_str("[workers]\nchannel_capacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_non_positive_cycle_rejected() {
        let err = EditorConfig::from_toml_str("[chain]\ncycle_duration = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EditorConfig::from_toml_str("[workers]\nthreads = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
