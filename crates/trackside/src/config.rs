//! # Screen Configuration
//!
//! Loaded once at startup from `trackside.toml`. Every section and field is
//! optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [viewport]
//! width = 1920.0
//! height = 1080.0
//!
//! [animation]
//! duration_ms = 150
//! easing = "exponential_out"
//!
//! [input]
//! drag_threshold = 4.0
//! double_click_ms = 300
//! double_click_distance = 5.0
//!
//! [rotation]
//! period_ms = 5000
//! clock = "frame"
//!
//! [theme]
//! base = "dark"
//!
//! [theme.overrides]
//! primary = "#33e6ff"
//!
//! [frame]
//! target_fps = 60
//! timing_logs = false
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trackside_ui::{AnimationConfig, Color, Easing, Rect, RouterConfig, Theme};

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The base theme name is not a built-in theme.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// An override names a token the theme does not have.
    #[error("unknown theme token: {0}")]
    UnknownToken(String),

    /// An override value is not a hex color.
    #[error("bad color for token {token}: {value}")]
    BadColor {
        /// Token being overridden.
        token: String,
        /// Offending value.
        value: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which clock drives rotating content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationClock {
    /// Accumulated frame time. Pauses with the frame loop.
    #[default]
    Frame,
    /// Wall-clock time. Keeps rotating across stalls.
    Wall,
}

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Animation timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSection {
    /// Duration of every bounds/alpha animation.
    pub duration_ms: u32,
    /// Easing curve.
    pub easing: Easing,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            duration_ms: 150,
            easing: Easing::ExponentialOut,
        }
    }
}

/// Pointer thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Travel in pixels before a press turns into a drag.
    pub drag_threshold: f32,
    /// Maximum gap between clicks of a double click.
    pub double_click_ms: u32,
    /// Maximum travel between clicks of a double click.
    pub double_click_distance: f32,
}

impl Default for InputSection {
    fn default() -> Self {
        let router = RouterConfig::default();
        Self {
            drag_threshold: router.drag_threshold,
            double_click_ms: 300,
            double_click_distance: router.double_click_distance,
        }
    }
}

/// Rotating content timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSection {
    /// Time each child stays on screen.
    pub period_ms: u32,
    /// Clock that measures the period.
    pub clock: RotationClock,
}

impl Default for RotationSection {
    fn default() -> Self {
        Self {
            period_ms: 5000,
            clock: RotationClock::Frame,
        }
    }
}

/// Theme selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSection {
    /// Built-in theme name (`dark` or `high_contrast`).
    pub base: String,
    /// Per-token hex colors, e.g. `primary = "#33e6ff"`.
    pub overrides: BTreeMap<String, String>,
}

impl Default for ThemeSection {
    fn default() -> Self {
        Self {
            base: "dark".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Frame loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSection {
    /// Target frames per second.
    pub target_fps: u32,
    /// Log frames that blow the budget.
    pub timing_logs: bool,
}

impl Default for FrameSection {
    fn default() -> Self {
        Self {
            target_fps: 60,
            timing_logs: false,
        }
    }
}

/// Complete screen configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracksideConfig {
    /// Screen size.
    pub viewport: ViewportConfig,
    /// Animation timing.
    pub animation: AnimationSection,
    /// Pointer thresholds.
    pub input: InputSection,
    /// Rotating content.
    pub rotation: RotationSection,
    /// Theme.
    pub theme: ThemeSection,
    /// Frame loop.
    pub frame: FrameSection,
}

impl TracksideConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML or out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = |field: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} must be positive"),
                })
            }
        };
        let non_negative = |field: &'static str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} must not be negative"),
                })
            }
        };

        positive("viewport.width", self.viewport.width)?;
        positive("viewport.height", self.viewport.height)?;
        non_negative("input.drag_threshold", self.input.drag_threshold)?;
        non_negative("input.double_click_distance", self.input.double_click_distance)?;
        if self.rotation.period_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "rotation.period_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.frame.target_fps == 0 {
            return Err(ConfigError::Invalid {
                field: "frame.target_fps",
                reason: "must be positive".to_string(),
            });
        }
        self.build_theme()?;
        Ok(())
    }

    /// Root rectangle of the node tree.
    #[must_use]
    pub fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height)
    }

    /// Base theme with overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown theme, token or color.
    pub fn build_theme(&self) -> ConfigResult<Theme> {
        let mut theme = Theme::by_name(&self.theme.base)
            .ok_or_else(|| ConfigError::UnknownTheme(self.theme.base.clone()))?;
        for (token, value) in &self.theme.overrides {
            let color = Color::parse_hex(value).ok_or_else(|| ConfigError::BadColor {
                token: token.clone(),
                value: value.clone(),
            })?;
            theme = theme
                .with_token(token, color)
                .ok_or_else(|| ConfigError::UnknownToken(token.clone()))?;
        }
        Ok(theme)
    }

    /// Animation policy for the node tree.
    ///
    /// A zero duration means animations land in one tick.
    #[must_use]
    pub fn animation_config(&self) -> AnimationConfig {
        let duration = self.animation.duration_ms as f32 / 1000.0;
        if self.animation.duration_ms == 0 {
            AnimationConfig::new(0.0, Easing::Instant)
        } else {
            AnimationConfig::new(duration, self.animation.easing)
        }
    }

    /// Input router thresholds.
    #[must_use]
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            drag_threshold: self.input.drag_threshold,
            double_click_time: self.input.double_click_ms as f32 / 1000.0,
            double_click_distance: self.input.double_click_distance,
        }
    }

    /// Rotation period in seconds.
    #[must_use]
    pub fn rotation_period(&self) -> f32 {
        self.rotation.period_ms as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = TracksideConfig::from_toml_str("").expect("valid");
        assert_eq!(config, TracksideConfig::default());
        assert_eq!(config.rotation.clock, RotationClock::Frame);
        assert_eq!(config.animation_config(), AnimationConfig::default());
        assert_eq!(config.router_config(), RouterConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = TracksideConfig::from_toml_str(
            r##"
            [viewport]
            width = 1280.0
            height = 720.0

            [animation]
            duration_ms = 250
            easing = "linear"

            [input]
            drag_threshold = 8.0

            [rotation]
            period_ms = 2000
            clock = "wall"

            [theme]
            base = "high_contrast"

            [theme.overrides]
            primary = "#ff0000"
            "##,
        )
        .expect("valid");

        assert_eq!(config.viewport_rect(), Rect::new(0.0, 0.0, 1280.0, 720.0));
        assert_eq!(config.animation_config(), AnimationConfig::new(0.25, Easing::Linear));
        assert_eq!(config.router_config().drag_threshold, 8.0);
        assert_eq!(config.rotation.clock, RotationClock::Wall);
        assert!((config.rotation_period() - 2.0).abs() < 1e-6);

        let theme = config.build_theme().expect("theme");
        assert_eq!(theme.primary, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(theme.text, Theme::HIGH_CONTRAST.text);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = TracksideConfig::from_toml_str("[viewport]\nwidth = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "viewport.width", .. }));

        let err = TracksideConfig::from_toml_str("[rotation]\nperiod_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "rotation.period_ms", .. }));

        let err = TracksideConfig::from_toml_str("[theme]\nbase = \"neon\"").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTheme(name) if name == "neon"));

        let err =
            TracksideConfig::from_toml_str("[theme.overrides]\nsparkle = \"#ffffff\"").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownToken(_)));

        let err =
            TracksideConfig::from_toml_str("[theme.overrides]\ntext = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::BadColor { .. }));

        let err = TracksideConfig::from_toml_str("[animation]\neasing = \"bouncy\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let config = TracksideConfig::from_toml_str("[animation]\nduration_ms = 0").expect("valid");
        assert_eq!(config.animation_config().easing, Easing::Instant);
    }

    #[test]
    fn test_missing_file() {
        let err = TracksideConfig::load("/nonexistent/trackside.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
