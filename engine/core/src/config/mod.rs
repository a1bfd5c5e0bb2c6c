//! Engine Configuration
//!
//! Every tunable the animation heuristics depend on, with TOML file
//! support at `~/.config/facesync/engine.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! A missing configuration file is not an error; defaults apply.
//!
//! # Example Configuration
//!
//! ```toml
//! [viseme]
//! match_threshold = 4
//!
//! [scheduler]
//! per_char_duration_ms = 80
//! fallback_duration_ms = 3000
//!
//! [animation]
//! crossfade_duration_ms = 200
//!
//! [blending]
//! expression_smoothing = 0.1
//! viseme_smoothing = 0.15
//! mouth_release_smoothing = 0.1
//! ```
//!
//! # Environment Variables
//!
//! - `FACESYNC_CONFIG`: path to an alternate configuration file
//! - `FACESYNC_VISEME_THRESHOLD`: overrides `viseme.match_threshold`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum per-code matches before a canonical viseme table is
    /// trusted. A majority-coverage heuristic: below it, the mouth would
    /// render visibly broken; full coverage is not required because
    /// several codes map to visually similar shapes.
    pub viseme_match_threshold: usize,

    /// Estimated speaking time per character of message text.
    pub per_char_duration_ms: u64,

    /// Estimate used for messages with empty text.
    pub fallback_duration_ms: u64,

    /// Body-clip crossfade length.
    pub crossfade_duration_ms: u64,

    /// Per-tick smoothing factor for expression morphs.
    pub expression_smoothing: f32,

    /// Per-tick smoothing factor driving the bound viseme morph to 1.
    pub viseme_smoothing: f32,

    /// Per-tick smoothing factor releasing unbound mouth morphs to 0.
    pub mouth_release_smoothing: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viseme_match_threshold: 4,
            per_char_duration_ms: 80,
            fallback_duration_ms: 3000,
            crossfade_duration_ms: 200,
            expression_smoothing: 0.1,
            viseme_smoothing: 0.15,
            mouth_release_smoothing: 0.1,
        }
    }
}

impl EngineConfig {
    /// Per-character estimate as a [`Duration`].
    #[must_use]
    pub fn per_char_duration(&self) -> Duration {
        Duration::from_millis(self.per_char_duration_ms)
    }

    /// Empty-text fallback estimate as a [`Duration`].
    #[must_use]
    pub fn fallback_duration(&self) -> Duration {
        Duration::from_millis(self.fallback_duration_ms)
    }

    /// Crossfade length as a [`Duration`].
    #[must_use]
    pub fn crossfade_duration(&self) -> Duration {
        Duration::from_millis(self.crossfade_duration_ms)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when a value is outside
    /// its meaningful range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=9).contains(&self.viseme_match_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "viseme.match_threshold must be within 1..=9, got {}",
                self.viseme_match_threshold
            )));
        }
        for (name, value) in [
            ("blending.expression_smoothing", self.expression_smoothing),
            ("blending.viseme_smoothing", self.viseme_smoothing),
            ("blending.mouth_release_smoothing", self.mouth_release_smoothing),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be within (0, 1], got {value}"
                )));
            }
        }
        if self.per_char_duration_ms == 0 {
            return Err(ConfigError::ValidationError(
                "scheduler.per_char_duration_ms must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Viseme section of the TOML configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisemeToml {
    /// Canonical-table selection threshold.
    pub match_threshold: Option<usize>,
}

/// Scheduler section of the TOML configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerToml {
    /// Estimated speaking time per character, milliseconds.
    pub per_char_duration_ms: Option<u64>,
    /// Empty-text fallback estimate, milliseconds.
    pub fallback_duration_ms: Option<u64>,
}

/// Animation section of the TOML configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Body-clip crossfade length, milliseconds.
    pub crossfade_duration_ms: Option<u64>,
}

/// Blending section of the TOML configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendingToml {
    /// Per-tick smoothing factor for expression morphs.
    pub expression_smoothing: Option<f32>,
    /// Per-tick smoothing factor for the bound viseme morph.
    pub viseme_smoothing: Option<f32>,
    /// Per-tick smoothing factor releasing unbound mouth morphs.
    pub mouth_release_smoothing: Option<f32>,
}

/// Root of the TOML configuration file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// `[viseme]` section.
    pub viseme: VisemeToml,
    /// `[scheduler]` section.
    pub scheduler: SchedulerToml,
    /// `[animation]` section.
    pub animation: AnimationToml,
    /// `[blending]` section.
    pub blending: BlendingToml,
}

impl EngineToml {
    /// Merge file values over the defaults.
    #[must_use]
    pub fn into_config(self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            viseme_match_threshold: self
                .viseme
                .match_threshold
                .unwrap_or(defaults.viseme_match_threshold),
            per_char_duration_ms: self
                .scheduler
                .per_char_duration_ms
                .unwrap_or(defaults.per_char_duration_ms),
            fallback_duration_ms: self
                .scheduler
                .fallback_duration_ms
                .unwrap_or(defaults.fallback_duration_ms),
            crossfade_duration_ms: self
                .animation
                .crossfade_duration_ms
                .unwrap_or(defaults.crossfade_duration_ms),
            expression_smoothing: self
                .blending
                .expression_smoothing
                .unwrap_or(defaults.expression_smoothing),
            viseme_smoothing: self
                .blending
                .viseme_smoothing
                .unwrap_or(defaults.viseme_smoothing),
            mouth_release_smoothing: self
                .blending
                .mouth_release_smoothing
                .unwrap_or(defaults.mouth_release_smoothing),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Default configuration file path (XDG config directory).
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("facesync").join("engine.toml"))
}

/// Load configuration from an explicit path.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, parsed, or
/// fails validation.
pub fn load_config_from_path(path: &Path) -> Result<EngineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: EngineToml = toml::from_str(&raw)?;
    let config = apply_env_overrides(parsed.into_config())?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `FACESYNC_CONFIG`, the default path, or
/// defaults when no file exists.
///
/// # Errors
///
/// Returns [`ConfigError`] when a file exists but cannot be read,
/// parsed, or validated.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let path = std::env::var("FACESYNC_CONFIG")
        .map(PathBuf::from)
        .ok()
        .or_else(default_config_path);

    match path {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => {
            let config = apply_env_overrides(EngineConfig::default())?;
            config.validate()?;
            Ok(config)
        }
    }
}

fn apply_env_overrides(mut config: EngineConfig) -> Result<EngineConfig, ConfigError> {
    if let Ok(raw) = std::env::var("FACESYNC_VISEME_THRESHOLD") {
        config.viseme_match_threshold = raw.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "FACESYNC_VISEME_THRESHOLD must be an integer, got {raw:?}"
            ))
        })?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = EngineConfig::default();

        assert_eq!(config.viseme_match_threshold, 4);
        assert_eq!(config.per_char_duration(), Duration::from_millis(80));
        assert_eq!(config.fallback_duration(), Duration::from_millis(3000));
        assert_eq!(config.crossfade_duration(), Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let parsed: EngineToml = toml::from_str(
            r#"
            [viseme]
            match_threshold = 6

            [blending]
            viseme_smoothing = 0.25
            "#,
        )
        .expect("toml should parse");
        let config = parsed.into_config();

        assert_eq!(config.viseme_match_threshold, 6);
        assert!((config.viseme_smoothing - 0.25).abs() < f32::EPSILON);
        // Untouched sections keep their defaults.
        assert_eq!(config.per_char_duration_ms, 80);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let parsed: EngineToml = toml::from_str("").expect("empty toml should parse");
        assert_eq!(parsed.into_config(), EngineConfig::default());
    }

    #[test]
    fn test_validation_rejects_out_of_range_threshold() {
        let config = EngineConfig {
            viseme_match_threshold: 12,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_rejects_bad_smoothing() {
        let config = EngineConfig {
            viseme_smoothing: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            expression_smoothing: 1.5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
