//! Error types for the photo day-stamper

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for day-stamper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the day-stamper
///
/// Variants fall into two tiers. Run-level errors abort the whole run before
/// any file is touched; file-level errors skip one file and the run goes on.
/// Use [`Error::is_fatal`] to tell them apart.
#[derive(Error, Debug)]
pub enum Error {
    // --- run-level ---
    #[error("Invalid target date '{value}' (expected YYYY-MM-DD): {source}")]
    InvalidTargetDate {
        value: String,
        source: chrono::ParseError,
    },

    #[error("Invalid watermark color '{value}': {message}")]
    InvalidColor { value: String, message: String },

    #[error("Failed to read font file {path}: {source}")]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse font data from {origin}: {message}")]
    FontParse { origin: String, message: String },

    #[error("Font size must be a positive number of points, got {size}")]
    InvalidFontSize { size: f32 },

    #[error("Input directory does not exist: {path}")]
    InputDirMissing { path: PathBuf },

    #[error("Input path is not a directory: {path}")]
    InputNotDirectory { path: PathBuf },

    #[error("Failed to read input directory {path}: {source}")]
    InputDirRead {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // --- file-level ---
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read metadata of {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File timestamp of {path} is outside the representable date range")]
    TimestampOutOfRange { path: PathBuf },

    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to create output file {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode image to {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl Error {
    /// Whether this error terminates the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::Open { .. }
                | Error::Metadata { .. }
                | Error::TimestampOutOfRange { .. }
                | Error::Decode { .. }
                | Error::Create { .. }
                | Error::Encode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_level_errors_are_not_fatal() {
        let err = Error::Open {
            path: PathBuf::from("a.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(!err.is_fatal());

        let err = Error::InputDirMissing {
            path: PathBuf::from("/nope"),
        };
        assert!(err.is_fatal());

        let err = Error::TimestampOutOfRange {
            path: PathBuf::from("b.png"),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_message_names_the_file() {
        let err = Error::Create {
            path: PathBuf::from("out/photo.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("out/photo.jpg"));
    }
}
