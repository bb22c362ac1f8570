//! CLI argument parsing with clap

use crate::config::{Config, DisplayZone, OutputNaming};
use clap::Parser;
use std::path::PathBuf;

/// Photo Day-Stamp - Burn capture date and day offset into photos
///
/// Stamps every JPEG/PNG in the input directory with its file timestamp
/// and the number of days since (or until) the target date, then writes
/// PNG copies to the output directory.
#[derive(Parser, Debug)]
#[command(name = "photo-daystamp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long, env = "DAYSTAMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory containing the photos to stamp
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory receiving the stamped copies
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target date (YYYY-MM-DD) that day offsets are counted from
    #[arg(short = 'd', long)]
    pub target_date: Option<String>,

    /// Watermark font size in points
    #[arg(long)]
    pub font_size: Option<f32>,

    /// TrueType/OpenType font file (defaults to the bundled DejaVu Sans)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Watermark color, #RRGGBB or #RRGGBBAA
    #[arg(long)]
    pub color: Option<String>,

    /// Text start distance from the left edge, in pixels
    #[arg(long)]
    pub offset_x: Option<u32>,

    /// Text baseline distance from the bottom edge, in pixels
    #[arg(long)]
    pub offset_y: Option<u32>,

    /// Output file naming:
    /// - keep: reuse the input file name (default)
    /// - png: change the extension to .png
    #[arg(long, value_enum)]
    pub output_naming: Option<OutputNaming>,

    /// Time zone of the printed timestamp
    #[arg(long, value_enum)]
    pub display_zone: Option<DisplayZone>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub print_config: bool,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log file format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref input) = self.input {
            config.input_dir = input.clone();
        }
        if let Some(ref output) = self.output {
            config.output_dir = output.clone();
        }
        if let Some(ref target_date) = self.target_date {
            config.target_date = target_date.clone();
        }
        if let Some(font_size) = self.font_size {
            config.font_size = font_size;
        }
        if let Some(ref font) = self.font {
            config.font_path = Some(font.clone());
        }
        if let Some(ref color) = self.color {
            config.color = color.clone();
        }
        if let Some(offset_x) = self.offset_x {
            config.offset_x = offset_x;
        }
        if let Some(offset_y) = self.offset_y {
            config.offset_y = offset_y;
        }
        if let Some(output_naming) = self.output_naming {
            config.output_naming = output_naming;
        }
        if let Some(display_zone) = self.display_zone {
            config.display_zone = display_zone;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
