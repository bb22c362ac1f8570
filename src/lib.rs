//! Photo Day-Stamp - Batch timestamp watermarking for photo folders
//!
//! This library stamps every photo in a directory with:
//! - Its reference time (file creation time, or modification time as fallback)
//! - The signed number of days between that time and a target date
//!
//! and writes the stamped copies as PNG files to an output directory.

pub mod cli;
pub mod config;
pub mod error;
pub mod imaging;
pub mod os;
pub mod process;
pub mod time;
pub mod watermark;

pub use cli::Cli;
pub use config::{Config, ConfigError, DisplayZone, OutputNaming, RunConfig};
pub use error::{Error, Result};
pub use process::{FileResult, ProcessingStats, ProcessingStatus, Processor, RunOutcome, bootstrap};
pub use time::{ReferenceTime, TimeSource};
pub use watermark::RasterFont;
