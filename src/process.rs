//! Batch processor
//!
//! Handles the core logic of:
//! - Validating run preconditions (target date, font, directories)
//! - Listing supported images in the input directory
//! - Resolving each file's reference timestamp and day offset
//! - Stamping the label onto the image and writing a PNG copy
//!
//! Files are handled one after another. A failure on one file is logged and
//! counted; the run moves on to the next file.

use crate::config::{Config, RunConfig};
use crate::error::{Error, Result};
use crate::imaging::{decode_canvas, output_path, write_png};
use crate::time::{ReferenceTime, day_offset, resolve_reference_time};
use crate::watermark::{RasterFont, WatermarkStyle, draw_watermark, watermark_text};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, trace, warn};
use walkdir::WalkDir;

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Destination file path (if successful)
    pub destination: Option<PathBuf>,
    /// Reference timestamp, once resolved
    pub time_info: Option<ReferenceTime>,
    /// Day offset from the target date, once computed
    pub day_offset: Option<i64>,
    /// Processing status
    pub status: ProcessingStatus,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// Watermarked copy written
    Success,
    /// Processing failed, file skipped
    Failed,
}

/// Processing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    /// Files with a supported extension
    pub candidates: usize,
    /// Files written successfully
    pub processed: usize,
    /// Files that failed and were skipped
    pub failed: usize,
    /// Non-image files left alone
    pub skipped: usize,
}

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The input directory held no supported images
    NoImages,
    /// Every supported image was written
    Completed,
    /// Some images failed
    CompletedWithFailures,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.candidates == 0 {
            RunOutcome::NoImages
        } else if self.failed == 0 {
            RunOutcome::Completed
        } else {
            RunOutcome::CompletedWithFailures
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Images: {}, Processed: {}, Failed: {}, Skipped: {}",
            self.candidates, self.processed, self.failed, self.skipped
        )
    }
}

/// Check every run-level precondition and load shared resources
///
/// Order: target date and color, font, input directory, output directory.
/// Any failure here is fatal and happens before a single file is read.
pub fn bootstrap(config: &Config) -> Result<(RunConfig, RasterFont)> {
    let run_config = RunConfig::from_config(config)?;
    let font = RasterFont::load(run_config.font_path.as_deref(), run_config.font_size)?;

    if !run_config.input_dir.exists() {
        return Err(Error::InputDirMissing {
            path: run_config.input_dir.clone(),
        });
    }
    if !run_config.input_dir.is_dir() {
        return Err(Error::InputNotDirectory {
            path: run_config.input_dir.clone(),
        });
    }

    fs::create_dir_all(&run_config.output_dir).map_err(|e| Error::OutputDirCreate {
        path: run_config.output_dir.clone(),
        source: e,
    })?;

    Ok((run_config, font))
}

/// Main processor for stamping a directory of photos
pub struct Processor {
    config: RunConfig,
    font: RasterFont,
    style: WatermarkStyle,
    stats: ProcessingStats,
}

impl Processor {
    /// Create a new processor from validated settings and a loaded font
    pub fn new(config: RunConfig, font: RasterFont) -> Self {
        let style = WatermarkStyle::from(&config);
        Self {
            config,
            font,
            style,
            stats: ProcessingStats::new(),
        }
    }

    /// Run the processing pipeline
    pub fn run(&mut self) -> Result<Vec<FileResult>> {
        let _span = span!(Level::INFO, "processor_run").entered();

        info!(
            input = %self.config.input_dir.display(),
            output = %self.config.output_dir.display(),
            target_date = %self.config.target_date,
            font = self.font.origin(),
            font_size = self.config.font_size,
            offset_x = self.config.offset_x,
            offset_y = self.config.offset_y,
            "Starting run"
        );

        self.stats = ProcessingStats::new();
        let files = self.collect_files()?;
        self.stats.candidates = files.len();
        info!(count = files.len(), "Found images");

        let mut results = Vec::with_capacity(files.len());
        for file_path in &files {
            let _file_span = span!(Level::DEBUG, "process_file", ?file_path).entered();
            let result = self.process_single_file(file_path);
            match result.status {
                ProcessingStatus::Success => self.stats.processed += 1,
                ProcessingStatus::Failed => self.stats.failed += 1,
            }
            results.push(result);
        }

        match self.stats.outcome() {
            RunOutcome::NoImages => info!(
                extensions = ?self.config.image_extensions,
                "No supported images found in input directory"
            ),
            RunOutcome::Completed => info!("{}", self.stats.summary()),
            RunOutcome::CompletedWithFailures => warn!("{}", self.stats.summary()),
        }

        Ok(results)
    }

    /// List supported images directly inside the input directory
    ///
    /// Sorted by file name. Subdirectories are skipped silently, other
    /// non-image entries with a log line.
    fn collect_files(&mut self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.config.input_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(Error::InputDirRead {
                        path: self.config.input_dir.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    self.stats.skipped += 1;
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_dir() {
                trace!(?path, "Skipping subdirectory");
                continue;
            }

            if entry.file_type().is_file() && self.config.is_supported(path) {
                files.push(path.to_path_buf());
            } else {
                info!(file = %entry.file_name().to_string_lossy(), "Skipping unsupported file");
                self.stats.skipped += 1;
            }
        }

        Ok(files)
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Process one file, turning any error into a failed result
    fn process_single_file(&self, path: &Path) -> FileResult {
        let mut result = FileResult {
            source: path.to_path_buf(),
            destination: None,
            time_info: None,
            day_offset: None,
            status: ProcessingStatus::Failed,
            error: None,
        };

        match self.stamp_file(path, &mut result) {
            Ok(dest_path) => {
                info!(
                    source = ?path,
                    destination = ?dest_path,
                    "Watermarked image saved"
                );
                result.destination = Some(dest_path);
                result.status = ProcessingStatus::Success;
            }
            Err(e) => {
                error!(?path, error = %e, "Failed to process file, skipping");
                result.error = Some(e.to_string());
            }
        }

        result
    }

    /// Open → resolve time → decode → draw → write
    ///
    /// Fills in `result` as facts become known so a failure late in the
    /// pipeline still reports the timestamp.
    fn stamp_file(&self, path: &Path, result: &mut FileResult) -> Result<PathBuf> {
        let file = File::open(path).map_err(|e| Error::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let metadata = file.metadata().map_err(|e| Error::Metadata {
            path: path.to_path_buf(),
            source: e,
        })?;

        let time_info = resolve_reference_time(path, &metadata)?;
        let offset = day_offset(self.config.target_date, &time_info.timestamp);
        result.time_info = Some(time_info);
        result.day_offset = Some(offset);

        let decoded = decode_canvas(path, file)?;
        info!(
            file = %path.display(),
            format = decoded.format_name(),
            time_source = time_info.source.label(),
            "Processing image"
        );
        let mut canvas = decoded.canvas;

        let label = watermark_text(&time_info.display(self.config.display_zone), offset);
        debug!(%label, width = canvas.width(), height = canvas.height(), "Drawing watermark");
        draw_watermark(&mut canvas, &self.font, &self.style, &label);

        let dest_path = output_path(&self.config.output_dir, path, self.config.output_naming);
        write_png(&canvas, &dest_path)?;

        Ok(dest_path)
    }
}
