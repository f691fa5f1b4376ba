#![forbid(unsafe_code)]

//! Router configuration.
//!
//! All tunables live in a single [`RouterConfig`] that can be loaded from
//! TOML or JSON at startup (with the `config` feature).
//!
//! # Loading
//!
//! ```toml
//! # scrollgate.toml
//! quiescence_timeout_ms = 100
//! send_gestures = true
//!
//! [overscroll]
//! enabled = true
//! start_threshold = 50.0
//! complete_threshold = 100.0
//! ```
//!
//! ```rust,ignore
//! let config = RouterConfig::load_validated("scrollgate.toml")?;
//! let config = RouterConfig::from_json_str(json)?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Default quiescence timeout for wheel sessions without phase information.
pub const DEFAULT_QUIESCENCE_TIMEOUT_MS: u64 = 100;

// ---------------------------------------------------------------------------
// RouterConfig
// ---------------------------------------------------------------------------

/// Top-level router configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RouterConfig {
    /// Idle time after the last phaseless wheel event before its gesture
    /// session is closed.
    pub quiescence_timeout_ms: u64,

    /// Synthesize gesture scrolls from unconsumed wheel events.
    pub send_gestures: bool,

    /// Overscroll state machine parameters.
    pub overscroll: OverscrollConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            quiescence_timeout_ms: DEFAULT_QUIESCENCE_TIMEOUT_MS,
            send_gestures: true,
            overscroll: OverscrollConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Quiescence timeout as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn quiescence_timeout(&self) -> Duration {
        Duration::from_millis(self.quiescence_timeout_ms)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load a file (JSON if the extension is `.json`, TOML otherwise) and
    /// reject it unless [`validate`](Self::validate) passes.
    #[cfg(feature = "config")]
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        config.validated()
    }

    /// Return `self` if valid, otherwise every validation error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.quiescence_timeout_ms == 0 {
            errors.push("quiescence_timeout_ms must be > 0".into());
        }

        let o = &self.overscroll;
        if !o.start_threshold.is_finite() || o.start_threshold <= 0.0 {
            errors.push(format!(
                "overscroll.start_threshold must be finite and > 0, got {}",
                o.start_threshold
            ));
        }
        if !o.complete_threshold.is_finite() {
            errors.push(format!(
                "overscroll.complete_threshold must be finite, got {}",
                o.complete_threshold
            ));
        } else if o.complete_threshold <= o.start_threshold {
            errors.push(format!(
                "overscroll.complete_threshold ({}) must exceed start_threshold ({})",
                o.complete_threshold, o.start_threshold
            ));
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// OverscrollConfig
// ---------------------------------------------------------------------------

/// Overscroll thresholds, in accumulated unconsumed pixels on the dominant
/// axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct OverscrollConfig {
    /// When `false`, unconsumed scroll never drives overscroll.
    pub enabled: bool,

    /// Accumulated delta that starts an overscroll.
    pub start_threshold: f32,

    /// Accumulated delta at which a reset completes instead of cancelling.
    /// Must exceed `start_threshold`.
    pub complete_threshold: f32,
}

impl Default for OverscrollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_threshold: 50.0,
            complete_threshold: 100.0,
        }
    }
}

impl OverscrollConfig {
    /// Config with the given thresholds, enabled.
    #[must_use]
    pub const fn with_thresholds(start_threshold: f32, complete_threshold: f32) -> Self {
        Self {
            enabled: true,
            start_threshold,
            complete_threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`RouterConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = RouterConfig::default();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        assert_eq!(config.quiescence_timeout(), Duration::from_millis(100));
        assert!(config.send_gestures);
        assert!(config.overscroll.enabled);
    }

    #[test]
    fn validate_catches_zero_timeout() {
        let mut config = RouterConfig::default();
        config.quiescence_timeout_ms = 0;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("quiescence_timeout_ms")));
    }

    #[test]
    fn validate_catches_inverted_thresholds() {
        let mut config = RouterConfig::default();
        config.overscroll = OverscrollConfig::with_thresholds(60.0, 40.0);
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("complete_threshold")));
    }

    #[test]
    fn validate_catches_equal_thresholds() {
        let mut config = RouterConfig::default();
        config.overscroll = OverscrollConfig::with_thresholds(50.0, 50.0);
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn validate_catches_non_finite_start() {
        let mut config = RouterConfig::default();
        config.overscroll.start_threshold = f32::NAN;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("start_threshold")));
    }

    #[test]
    fn validated_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.quiescence_timeout_ms = 0;
        config.overscroll.start_threshold = -1.0;
        match config.validated() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validation_error_display_joins() {
        let err = ConfigError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation errors: a; b");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_partial_uses_defaults() {
        let config = RouterConfig::from_toml_str(
            "quiescence_timeout_ms = 250\n[overscroll]\nstart_threshold = 30.0\n",
        )
        .expect("valid toml");
        assert_eq!(config.quiescence_timeout_ms, 250);
        assert_eq!(config.overscroll.start_threshold, 30.0);
        assert_eq!(config.overscroll.complete_threshold, 100.0);
        assert!(config.send_gestures);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_round_trip() {
        let config = RouterConfig {
            quiescence_timeout_ms: 80,
            send_gestures: false,
            overscroll: OverscrollConfig::with_thresholds(30.0, 50.0),
        };
        let json = serde_json::to_string(&config).expect("serialize");
        assert_eq!(RouterConfig::from_json_str(&json).expect("parse"), config);
    }

    #[cfg(feature = "config")]
    #[test]
    fn malformed_toml_is_toml_error() {
        let err = RouterConfig::from_toml_str("quiescence_timeout_ms = [").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }
}
