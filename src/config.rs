//! Studio configuration module.
//!
//! Handles loading, validating, and merging `studio.toml`. Stock defaults are
//! serialized to a TOML table first, the user's file is merged on top, and the
//! merged table is deserialized and validated. A missing file simply yields
//! the stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [export]
//! quality = 90              # JPEG quality (1-100)
//! output_dir = "exports"    # Where slide-<id>.jpg files are written
//!
//! [caption]
//! font_scale = 2.5          # On-screen px → export px multiplier
//! line_height = 1.4         # Line advance as a multiple of the font size
//! margin = 40               # Side and bottom margin at the reference width
//! reference_width = 1080    # Canvas width the margin is specified for
//! min_font_size = 12
//! max_font_size = 48
//!
//! [overlay]
//! gradient_start = 0.4      # Fraction of canvas height where the shadow begins
//!
//! [preview]
//! container_width = 540     # On-screen preview width in px
//!
//! [defaults]                # Applied to newly added slides
//! caption = "Write your caption here..."
//! font_family = "inter"
//! text_color = "#FFFFFF"
//! alignment = "center"
//! font_size = 18
//! gradient_intensity = 0.7
//! aspect_ratio = "1 / 1"
//!
//! [fonts]                   # Family key → font file
//! inter = "fonts/Inter-Regular.ttf"
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [export]
//! quality = 95
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::aspect::AspectRatio;
use crate::types::Alignment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up when no `--config` is given.
pub const CONFIG_FILENAME: &str = "studio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Studio configuration loaded from `studio.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// JPEG encoding and output location.
    pub export: ExportConfig,
    /// Caption typography on the export canvas.
    pub caption: CaptionConfig,
    /// Bottom shadow overlay.
    pub overlay: OverlayConfig,
    /// Live preview container sizing.
    pub preview: PreviewConfig,
    /// Values given to newly added slides.
    pub defaults: SlideDefaults,
    /// Font family key → font file path.
    pub fonts: BTreeMap<String, PathBuf>,
    /// Log level and format.
    pub logging: LoggingConfig,
}

impl StudioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.export.quality) {
            return Err(ConfigError::Validation(
                "export.quality must be 1-100".into(),
            ));
        }
        let c = &self.caption;
        if !(c.font_scale > 0.0 && c.line_height > 0.0) {
            return Err(ConfigError::Validation(
                "caption.font_scale and caption.line_height must be positive".into(),
            ));
        }
        if c.margin < 0.0 || c.reference_width <= 0.0 {
            return Err(ConfigError::Validation(
                "caption.margin must be >= 0 and caption.reference_width > 0".into(),
            ));
        }
        if c.min_font_size <= 0.0 || c.min_font_size > c.max_font_size {
            return Err(ConfigError::Validation(
                "caption.min_font_size must be positive and <= caption.max_font_size".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.overlay.gradient_start) {
            return Err(ConfigError::Validation(
                "overlay.gradient_start must be in [0, 1)".into(),
            ));
        }
        if self.preview.container_width <= 0.0 {
            return Err(ConfigError::Validation(
                "preview.container_width must be positive".into(),
            ));
        }
        if AspectRatio::parse(&self.defaults.aspect_ratio).is_none() {
            return Err(ConfigError::Validation(format!(
                "defaults.aspect_ratio '{}' is not one of: {}",
                self.defaults.aspect_ratio,
                AspectRatio::ALL.map(|r| r.as_ratio_str()).join(", ")
            )));
        }
        Ok(())
    }
}

/// JPEG export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// JPEG quality, 1 (worst) to 100 (best).
    pub quality: u8,
    /// Directory that receives `slide-<id>.jpg` files.
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            output_dir: PathBuf::from("exports"),
        }
    }
}

/// Caption layout on the export canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// Multiplier from the on-screen font size to export pixels.
    pub font_scale: f32,
    /// Line advance as a multiple of the export font size.
    pub line_height: f32,
    /// Side and bottom margin in px at `reference_width`.
    pub margin: f32,
    /// Canvas width the margin is expressed for; other widths scale it.
    pub reference_width: f32,
    pub min_font_size: f32,
    pub max_font_size: f32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font_scale: 2.5,
            line_height: 1.4,
            margin: 40.0,
            reference_width: 1080.0,
            min_font_size: 12.0,
            max_font_size: 48.0,
        }
    }
}

/// Bottom shadow overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Fraction of the canvas height where the gradient starts (transparent).
    pub gradient_start: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            gradient_start: 0.4,
        }
    }
}

/// Live preview sizing, used when simulating drags from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Preview width in px; the height follows the slide's aspect ratio.
    pub container_width: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            container_width: 540.0,
        }
    }
}

/// Style and geometry given to a slide when its image is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlideDefaults {
    pub caption: String,
    pub font_family: String,
    pub text_color: String,
    pub alignment: Alignment,
    pub font_size: f32,
    pub gradient_intensity: f32,
    pub aspect_ratio: String,
}

impl Default for SlideDefaults {
    fn default() -> Self {
        Self {
            caption: "Write your caption here...".to_string(),
            font_family: "inter".to_string(),
            text_color: "#FFFFFF".to_string(),
            alignment: Alignment::Center,
            font_size: 18.0,
            gradient_intensity: 0.7,
            aspect_ratio: AspectRatio::Square.as_ratio_str().to_string(),
        }
    }
}

/// Logging settings. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"carousel_studio=debug"`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StudioConfig::default()).expect("default config must serialize")
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
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but is
/// not valid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StudioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StudioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults.
///
/// Relative font paths are resolved against the config file's directory, so
/// a deck and its `studio.toml` can be moved together.
pub fn load_config(path: &Path) -> Result<StudioConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(stock_defaults_value(), overlay)?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    for font_path in config.fonts.values_mut() {
        if font_path.is_relative() {
            *font_path = base_dir.join(&*font_path);
        }
    }
    Ok(config)
}

/// Returns a fully-commented stock `studio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Carousel Studio Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# JPEG quality (1 = worst, 100 = best).
quality = 90

# Directory receiving slide-<id>.jpg files.
output_dir = "exports"

# ---------------------------------------------------------------------------
# Caption typography on the export canvas
# ---------------------------------------------------------------------------
[caption]
# Export font size = on-screen font size * font_scale.
font_scale = 2.5

# Line advance as a multiple of the export font size.
line_height = 1.4

# Side and bottom margin in px, specified for a canvas reference_width wide.
# Wider or narrower canvases scale the margin proportionally.
margin = 40.0
reference_width = 1080.0

# Slide font sizes outside this range are clamped.
min_font_size = 12.0
max_font_size = 48.0

# ---------------------------------------------------------------------------
# Bottom shadow overlay
# ---------------------------------------------------------------------------
[overlay]
# Fraction of the canvas height where the shadow begins (fully transparent).
# It darkens linearly to the slide's gradient_intensity at the bottom edge.
gradient_start = 0.4

# ---------------------------------------------------------------------------
# Preview
# ---------------------------------------------------------------------------
[preview]
# On-screen preview width in px. Drag distances given to `pan` are measured
# against this container; its height follows the slide's aspect ratio.
container_width = 540.0

# ---------------------------------------------------------------------------
# Defaults for newly added slides
# ---------------------------------------------------------------------------
[defaults]
caption = "Write your caption here..."
# One of: inter, playfair, roboto-mono, merriweather, oswald
font_family = "inter"
text_color = "#FFFFFF"
# One of: left, center, right
alignment = "center"
font_size = 18.0
gradient_intensity = 0.7
# One of: "1 / 1", "4 / 5", "9 / 16", "16 / 9"
aspect_ratio = "1 / 1"

# ---------------------------------------------------------------------------
# Caption fonts
# ---------------------------------------------------------------------------
# Map family keys to TTF/OTF files. Relative paths are resolved against the
# directory holding this file. Families without a file fall back to inter;
# with no usable font at all, captions are skipped and a warning is logged.
[fonts]
# inter = "fonts/Inter-Regular.ttf"
# playfair = "fonts/PlayfairDisplay-Regular.ttf"
# roboto-mono = "fonts/RobotoMono-Regular.ttf"
# merriweather = "fonts/Merriweather-Regular.ttf"
# oswald = "fonts/Oswald-Regular.ttf"

# ---------------------------------------------------------------------------
# Logging (RUST_LOG overrides level)
# ---------------------------------------------------------------------------
[logging]
level = "info"
json = false
"##
}
