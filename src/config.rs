//! Pipeline configuration.
//!
//! Handles loading, validating, and merging `backdrop.toml`. Stock defaults
//! are overridden by whatever keys the user file sets; everything else keeps
//! its default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [upscaler]
//! # binary = "/opt/waifu2x/waifu2x-ncnn-vulkan"
//! gpu = 0                   # GPU device id passed to the upscaler
//! # scale = 4               # Fixed scale (1/2/4/8/16/32); omit to compute
//!
//! [blur]
//! radius = 16               # Standalone blur radius
//! background_radius = 24    # Backdrop blur radius in the full pipeline
//!
//! [edge]
//! color = [255, 255, 255]   # Padding color behind the feathered edge
//!
//! [output]
//! quality = 100             # JPEG quality (1-100)
//!
//! [save]
//! cropped = true            # Which pipeline steps write files
//! blurred = false
//! mixed = true
//! feathered = true
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{BlurRadius, FillColor, Quality, StepOptions};
use crate::upscale::SUPPORTED_SCALES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "backdrop.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `backdrop.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// External upscaler invocation.
    pub upscaler: UpscalerConfig,
    /// Blur radii.
    pub blur: BlurConfig,
    /// Feathered edge settings.
    pub edge: EdgeConfig,
    /// Encoding settings.
    pub output: OutputConfig,
    /// Which pipeline steps persist their output.
    pub save: SaveConfig,
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.quality == 0 || self.output.quality > 100 {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.blur.radius == 0 || self.blur.background_radius == 0 {
            return Err(ConfigError::Validation(
                "blur radii must be greater than 0".into(),
            ));
        }
        if let Some(scale) = self.upscaler.scale {
            if !SUPPORTED_SCALES.contains(&scale) {
                return Err(ConfigError::Validation(format!(
                    "upscaler.scale must be one of {:?}, got {}",
                    SUPPORTED_SCALES, scale
                )));
            }
        }
        Ok(())
    }

    /// Step options for a step whose save flag is `save`.
    pub fn step_options(&self, save: bool) -> StepOptions {
        StepOptions {
            save,
            quality: Quality::new(self.output.quality),
        }
    }

    pub fn fill_color(&self) -> FillColor {
        FillColor(self.edge.color)
    }
}

/// External upscaler settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpscalerConfig {
    /// Path to the upscaler executable. Only required when an image has not
    /// been upscaled yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,
    /// GPU device id.
    pub gpu: i32,
    /// Fixed scale factor. When absent, the smallest power of two that
    /// reaches 4K is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

/// Blur radii in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlurConfig {
    /// Radius for the standalone `blur` command.
    pub radius: u32,
    /// Radius for the backdrop layer in the full pipeline.
    pub background_radius: u32,
}

impl BlurConfig {
    pub fn general(&self) -> BlurRadius {
        BlurRadius(self.radius as f32)
    }

    pub fn background(&self) -> BlurRadius {
        BlurRadius(self.background_radius as f32)
    }
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            radius: BlurRadius::GENERAL.sigma() as u32,
            background_radius: BlurRadius::BACKGROUND.sigma() as u32,
        }
    }
}

/// Feathered edge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdgeConfig {
    /// Padding color as `[r, g, b]`.
    pub color: [u8; 3],
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            color: FillColor::default().0,
        }
    }
}

/// Encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1-100). Lossless formats ignore it.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

/// Per-step save flags for the full pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveConfig {
    pub cropped: bool,
    pub blurred: bool,
    pub mixed: bool,
    pub feathered: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            cropped: true,
            blurred: false,
            mixed: true,
            feathered: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PipelineConfig::default())?)
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

/// Load `backdrop.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    read_raw(&config_path).map(Some)
}

fn read_raw(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `backdrop.toml` in the given directory, or stock
/// defaults if there is none.
pub fn load_config(dir: &Path) -> Result<PipelineConfig, ConfigError> {
    resolve_config(load_raw_config(dir)?)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
    resolve_config(Some(read_raw(path)?))
}

/// Returns a fully-commented stock `backdrop.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Backdrop Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# External upscaler (waifu2x-ncnn-vulkan)
# ---------------------------------------------------------------------------
[upscaler]
# Path to the upscaler executable. Needed only when <name>_scaled.<ext>
# does not exist yet next to the source image.
# binary = "/opt/waifu2x/waifu2x-ncnn-vulkan"

# GPU device id passed as -g.
gpu = 0

# Fixed scale factor: one of 1, 2, 4, 8, 16, 32.
# Omit to use the smallest power of two that reaches 3840x2160.
# scale = 4

# ---------------------------------------------------------------------------
# Blur
# ---------------------------------------------------------------------------
[blur]
# Gaussian radius for the standalone `blur` command.
radius = 16

# Gaussian radius for the blurred backdrop in the full pipeline.
background_radius = 24

# ---------------------------------------------------------------------------
# Feathered edge
# ---------------------------------------------------------------------------
[edge]
# Padding color [r, g, b] that the edge fades into.
color = [255, 255, 255]

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best). PNG, TIFF and WebP are lossless.
quality = 100

# ---------------------------------------------------------------------------
# Which pipeline steps write a file next to the source
# ---------------------------------------------------------------------------
[save]
cropped = true
blurred = false
mixed = true
feathered = true
"##
}

/// Where to look for config when no explicit file was given.
pub fn default_config_dir() -> PathBuf {
    PathBuf::from(".")
}
