#![forbid(unsafe_code)]

//! File-based configuration for the visualizer.
//!
//! Loadable from TOML or JSON. Every field has a default, so an empty file is
//! a valid configuration.
//!
//! ```toml
//! poll_interval_ms = 100
//!
//! [colors]
//! negative = [255, 0, 0]
//! positive = [0, 0, 255]
//!
//! [viewport]
//! width = 500
//! height = 400
//! ```
//!
//! Color channels are read as written (integer, float, or string) and only
//! validated by [`VisualizerConfig::validate`]. Only integer literals in
//! `0..=255` are valid; floats such as `12.0` are errors, and nothing is
//! clamped on the way in.

use std::path::Path;
use std::time::Duration;

use nnviz_core::{ChannelInput, ColorScheme, ConfigurationError};
use nnviz_layout::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Viewport};
use serde::{Deserialize, Serialize};

/// Default mailbox poll interval.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid color: {0}")]
    Color(#[from] ConfigurationError),

    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub negative: [ChannelInput; 3],
    pub positive: [ChannelInput; 3],
}

impl Default for ColorsConfig {
    fn default() -> Self {
        let scheme = ColorScheme::default();
        let channels = |c: nnviz_core::Rgb| [c.r.into(), c.g.into(), c.b.into()];
        Self {
            negative: channels(scheme.negative),
            positive: channels(scheme.positive),
        }
    }
}

impl ColorsConfig {
    pub fn scheme(&self) -> Result<ColorScheme, ConfigurationError> {
        ColorScheme::try_from_channels(&self.negative, &self.positive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Raw, unvalidated configuration as read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub colors: ColorsConfig,
    pub viewport: ViewportConfig,
    pub poll_interval_ms: u64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            colors: ColorsConfig::default(),
            viewport: ViewportConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Validated settings, ready to hand to the runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub scheme: ColorScheme,
    pub viewport: Viewport,
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scheme: ColorScheme::default(),
            viewport: Viewport::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl VisualizerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load by extension: `.json` is JSON, anything else is TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Check every field, returning the first problem found.
    ///
    /// Viewport dimensions are not errors: unusable values fall back to the
    /// defaults the same way a host-reported size does.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let scheme = self.colors.scheme()?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(Settings {
            scheme,
            viewport: Viewport::resolve(self.viewport.width, self.viewport.height),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        })
    }
}
