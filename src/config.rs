//! Configuration types for the photo day-stamper

use crate::error::{Error, Result};
use crate::time::parse_target_date;
use chrono::NaiveDate;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How output files are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputNaming {
    /// Reuse the input file name verbatim, extension included, even though
    /// the content is always PNG
    #[default]
    Keep,
    /// Replace the input extension with `.png`
    Png,
}

/// Time zone used when printing the timestamp into the watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayZone {
    /// The machine's local time zone
    #[default]
    Local,
    /// Coordinated Universal Time
    Utc,
}

/// Configuration for the day-stamper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory containing the photos to stamp
    pub input_dir: PathBuf,

    /// Directory receiving the stamped copies
    pub output_dir: PathBuf,

    /// Target date (YYYY-MM-DD) that day offsets are measured from
    pub target_date: String,

    /// Watermark font size in points
    pub font_size: f32,

    /// Optional TrueType/OpenType font file; the bundled font is used when unset
    pub font_path: Option<PathBuf>,

    /// Watermark color as `#RRGGBB` or `#RRGGBBAA`
    pub color: String,

    /// Distance of the text start from the left edge, in pixels
    pub offset_x: u32,

    /// Distance of the text baseline from the bottom edge, in pixels
    pub offset_y: u32,

    /// Output file naming policy
    pub output_naming: OutputNaming,

    /// Time zone for the printed timestamp
    pub display_zone: DisplayZone,

    /// Verbose output
    pub verbose: bool,

    /// Supported image extensions (matched case-insensitively)
    pub image_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("photos"),
            output_dir: PathBuf::from("output_images"),
            target_date: "2024-10-03".into(),
            font_size: 70.0,
            font_path: None,
            color: "#FFA500".into(),
            offset_x: 100,
            offset_y: 100,
            output_naming: OutputNaming::default(),
            display_zone: DisplayZone::default(),
            verbose: false,
            image_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            source: e,
        })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r##"# Photo Day-Stamp Configuration File
# This file uses TOML format (https://toml.io)

# Directory containing the photos to stamp (not searched recursively)
input_dir = "photos"

# Directory receiving the stamped copies (created if missing)
output_dir = "output_images"

# Day offsets are counted from this date (YYYY-MM-DD, UTC calendar day)
target_date = "2024-10-03"

# Font size in points (rendered at 72 DPI)
font_size = 70.0

# Optional font file; the bundled DejaVu Sans is used when omitted
# font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"

# Watermark color: "#RRGGBB" or "#RRGGBBAA"
color = "#FFA500"

# Text start distance from the left edge, in pixels
offset_x = 100

# Text baseline distance from the bottom edge, in pixels
offset_y = 100

# Output naming: "keep" or "png"
# - keep: reuse the input name (photo.jpg holds PNG data)
# - png: rename the extension to .png
output_naming = "keep"

# Time zone of the printed timestamp: "local" or "utc"
display_zone = "local"

# Verbose output
verbose = false

# Supported file extensions
image_extensions = ["jpg", "jpeg", "png"]
"##
        .to_string()
    }
}

/// Validated, immutable settings for one run
///
/// Built once at startup from a [`Config`] and shared by reference with the
/// processor. Nothing in it changes after construction.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub target_date: NaiveDate,
    pub font_size: f32,
    pub font_path: Option<PathBuf>,
    pub color: Rgba<u8>,
    pub offset_x: u32,
    pub offset_y: u32,
    pub output_naming: OutputNaming,
    pub display_zone: DisplayZone,
    pub image_extensions: Vec<String>,
}

impl RunConfig {
    /// Validate a user configuration
    ///
    /// Fails on a malformed target date or color. Directory checks happen
    /// later, in [`crate::process::bootstrap`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let target_date = parse_target_date(&config.target_date)?;
        let color = parse_color(&config.color)?;

        Ok(Self {
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
            target_date,
            font_size: config.font_size,
            font_path: config.font_path.clone(),
            color,
            offset_x: config.offset_x,
            offset_y: config.offset_y,
            output_naming: config.output_naming,
            display_zone: config.display_zone,
            image_extensions: config
                .image_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        })
    }

    /// Check if a path has a supported image extension
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.image_extensions.iter().any(|e| e == &ext_lower)
            })
            .unwrap_or(false)
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA` into an RGBA color
pub fn parse_color(value: &str) -> Result<Rgba<u8>> {
    let invalid = |message: &str| Error::InvalidColor {
        value: value.to_string(),
        message: message.to_string(),
    };

    let hex = value
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| invalid("color must start with '#'"))?;

    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return Err(invalid("expected #RRGGBB or #RRGGBBAA"));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid("invalid hex digit"))
    };

    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError {
        source: toml::ser::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
