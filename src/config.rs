//! Compression configuration: presets, the shared runtime configuration, and
//! `web-optimizer.toml` loading.
//!
//! ## Presets
//!
//! A preset is a named, fixed combination of quality, bounds, and format. While
//! a preset is active those four fields are locked: the setters on
//! [`CompressionConfig`] refuse to change them. Selecting
//! [`PresetMode::Custom`] releases the lock and keeps the current values as a
//! starting point.
//!
//! | Preset | Quality | Max size | Format | Use case |
//! |---|---|---|---|---|
//! | `hero` | 0.85 | 1920×1080 | webp | Above-the-fold banners |
//! | `thumbnail` | 0.75 | 400×400 | webp | Product grids, listings |
//! | `gallery` | 0.80 | 1200×800 | webp | Portfolios, showcases |
//! | `background` | 0.70 | 1920×1080 | jpeg | Section backgrounds |
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! preset = "hero"           # custom | hero | thumbnail | gallery | background
//! quality = 0.85            # (0, 1], only used with preset = "custom"
//! max_width = 1920
//! max_height = 1080
//! format = "webp"           # original | jpeg | png | webp
//!
//! [intake]
//! max_file_size_mb = 50     # Larger files are rejected
//!
//! [output]
//! dir = "optimized"         # Where compressed files are written
//! ```
//!
//! Config files are sparse and merged onto the stock defaults. Unknown keys are
//! rejected to catch typos early.

use crate::encoder::{EncodeFormat, EncodeOptions, Quality};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "web-optimizer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Preset '{preset}' is active; select the custom preset to change {field}")]
    PresetLocked { preset: PresetMode, field: &'static str },
}

// =============================================================================
// Formats and presets
// =============================================================================

/// Output format tag. `Original` keeps whatever format the source was in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Original,
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// The codec to convert to, or `None` for "no conversion".
    pub fn encode_format(self) -> Option<EncodeFormat> {
        match self {
            Self::Original => None,
            Self::Jpeg => Some(EncodeFormat::Jpeg),
            Self::Png => Some(EncodeFormat::Png),
            Self::Webp => Some(EncodeFormat::Webp),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PresetMode {
    Custom,
    #[default]
    Hero,
    Thumbnail,
    Gallery,
    Background,
}

impl PresetMode {
    /// Preset values, or `None` for custom.
    pub fn preset(self) -> Option<&'static Preset> {
        PRESETS
            .iter()
            .find(|(mode, _)| *mode == self)
            .map(|(_, preset)| preset)
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Hero => "hero",
            Self::Thumbnail => "thumbnail",
            Self::Gallery => "gallery",
            Self::Background => "background",
        }
    }
}

impl fmt::Display for PresetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A named, fixed combination of compression settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub quality: f32,
    pub max_width: u32,
    pub max_height: u32,
    pub format: OutputFormat,
    pub use_case: &'static str,
    pub performance_tip: &'static str,
}

pub static PRESETS: [(PresetMode, Preset); 4] = [
    (
        PresetMode::Hero,
        Preset {
            name: "Hero/Banner",
            description: "Main highlight images",
            quality: 0.85,
            max_width: 1920,
            max_height: 1080,
            format: OutputFormat::Webp,
            use_case: "First impression of the site",
            performance_tip: "High quality with optimized loading",
        },
    ),
    (
        PresetMode::Thumbnail,
        Preset {
            name: "Thumbnails",
            description: "Small preview images",
            quality: 0.75,
            max_width: 400,
            max_height: 400,
            format: OutputFormat::Webp,
            use_case: "Galleries and product listings",
            performance_tip: "Maximum compression for fast loading",
        },
    ),
    (
        PresetMode::Gallery,
        Preset {
            name: "Gallery",
            description: "Gallery and portfolio images",
            quality: 0.80,
            max_width: 1200,
            max_height: 800,
            format: OutputFormat::Webp,
            use_case: "Portfolios and showcases",
            performance_tip: "Balance between quality and performance",
        },
    ),
    (
        PresetMode::Background,
        Preset {
            name: "Background",
            description: "Background images",
            quality: 0.70,
            max_width: 1920,
            max_height: 1080,
            format: OutputFormat::Jpeg,
            use_case: "Section and page backgrounds",
            performance_tip: "Aggressive compression without losing impact",
        },
    ),
];

// =============================================================================
// Runtime configuration
// =============================================================================

/// The single, shared compression configuration.
///
/// Fields are private so the preset lock cannot be bypassed: while
/// `preset != Custom`, quality/bounds/format always equal the preset's values.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionConfig {
    quality: Quality,
    max_width: u32,
    max_height: u32,
    format: OutputFormat,
    preset: PresetMode,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        let mut config = Self {
            quality: Quality::default(),
            max_width: 1,
            max_height: 1,
            format: OutputFormat::Original,
            preset: PresetMode::Custom,
        };
        config.select_preset(PresetMode::default());
        config
    }
}

impl CompressionConfig {
    /// Build from file settings. A non-custom preset overrides the explicit
    /// values in the file.
    pub fn from_settings(settings: &CompressionSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut config = Self {
            quality: Quality::new(settings.quality),
            max_width: settings.max_width,
            max_height: settings.max_height,
            format: settings.format,
            preset: PresetMode::Custom,
        };
        config.select_preset(settings.preset);
        Ok(config)
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn preset(&self) -> PresetMode {
        self.preset
    }

    pub fn is_locked(&self) -> bool {
        self.preset != PresetMode::Custom
    }

    /// Longer-edge bound handed to the encoder.
    pub fn max_dimension(&self) -> u32 {
        self.max_width.max(self.max_height)
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            max_dimension: self.max_dimension(),
            quality: self.quality,
            target: self.format.encode_format(),
        }
    }

    /// Switch preset. Named presets copy their values; custom keeps the
    /// current ones and unlocks them.
    pub fn select_preset(&mut self, mode: PresetMode) {
        if let Some(preset) = mode.preset() {
            self.quality = Quality::new(preset.quality);
            self.max_width = preset.max_width;
            self.max_height = preset.max_height;
            self.format = preset.format;
        }
        self.preset = mode;
    }

    fn ensure_unlocked(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.is_locked() {
            return Err(ConfigError::PresetLocked {
                preset: self.preset,
                field,
            });
        }
        Ok(())
    }

    pub fn set_quality(&mut self, quality: f32) -> Result<(), ConfigError> {
        self.ensure_unlocked("quality")?;
        validate_quality(quality)?;
        self.quality = Quality::new(quality);
        Ok(())
    }

    pub fn set_max_width(&mut self, max_width: u32) -> Result<(), ConfigError> {
        self.ensure_unlocked("max_width")?;
        validate_bound("max_width", max_width)?;
        self.max_width = max_width;
        Ok(())
    }

    pub fn set_max_height(&mut self, max_height: u32) -> Result<(), ConfigError> {
        self.ensure_unlocked("max_height")?;
        validate_bound("max_height", max_height)?;
        self.max_height = max_height;
        Ok(())
    }

    pub fn set_format(&mut self, format: OutputFormat) -> Result<(), ConfigError> {
        self.ensure_unlocked("format")?;
        self.format = format;
        Ok(())
    }
}

fn validate_quality(quality: f32) -> Result<(), ConfigError> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "compression.quality must be in (0, 1], got {quality}"
        )));
    }
    Ok(())
}

fn validate_bound(field: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "compression.{field} must be positive"
        )));
    }
    Ok(())
}

// =============================================================================
// Config file
// =============================================================================

/// Application configuration loaded from `web-optimizer.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Initial compression settings.
    pub compression: CompressionSettings,
    /// File acceptance limits.
    pub intake: IntakeSettings,
    /// Where results are written.
    pub output: OutputSettings,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compression.validate()?;
        if self.intake.max_file_size_mb == 0 {
            return Err(ConfigError::Validation(
                "intake.max_file_size_mb must be positive".into(),
            ));
        }
        if self.output.dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Compression settings as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionSettings {
    pub preset: PresetMode,
    /// Lossy quality in `(0, 1]`. Ignored unless `preset = "custom"`.
    pub quality: f32,
    pub max_width: u32,
    pub max_height: u32,
    pub format: OutputFormat,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        let config = CompressionConfig::default();
        Self {
            preset: config.preset(),
            quality: config.quality().value(),
            max_width: config.max_width(),
            max_height: config.max_height(),
            format: config.format(),
        }
    }
}

impl CompressionSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_quality(self.quality)?;
        validate_bound("max_width", self.max_width)?;
        validate_bound("max_height", self.max_height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeSettings {
    /// Files larger than this are rejected at intake.
    pub max_file_size_mb: u64,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
        }
    }
}

impl IntakeSettings {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub dir: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: "optimized".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Used as the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the application config.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in `dir`
/// is used when present and stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let path = dir.join(DEFAULT_CONFIG_FILE);
            if path.exists() {
                Some(load_raw_config(&path)?)
            } else {
                None
            }
        }
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `web-optimizer.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# web-optimizer configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# One of: custom, hero, thumbnail, gallery, background.
# A named preset fixes quality, max_width, max_height and format; the values
# below only take effect with preset = "custom".
preset = "hero"

# Lossy quality in (0, 1]. Applies to JPEG output.
quality = 0.85

# Bounds in pixels. The longer of the two bounds the longer image edge;
# images are never upscaled.
max_width = 1920
max_height = 1080

# One of: original, jpeg, png, webp.
format = "webp"

# ---------------------------------------------------------------------------
# Intake
# ---------------------------------------------------------------------------
[intake]
# Files larger than this (in MiB) are rejected.
max_file_size_mb = 50

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory compressed files are written to (created if missing).
dir = "optimized"
"##
}
