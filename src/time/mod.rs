//! Time handling module
//!
//! This module provides:
//! - Reference timestamp resolution from file system metadata
//!   (creation time, falling back to modification time)
//! - Day-offset arithmetic against the configured target date
//! - Timestamp formatting for the watermark label

pub mod offset;

pub use offset::{day_offset, parse_target_date};

use crate::config::DisplayZone;
use crate::error::{Error, Result};
use crate::os;
use chrono::{DateTime, Local, Utc};
use filetime::FileTime;
use std::fs::Metadata;
use std::path::Path;
use tracing::{debug, warn};

/// Format used for the timestamp in the watermark label
pub const LABEL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the reference timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// File system creation (birth) time
    Created,
    /// File system modification time, used when creation time is missing
    Modified,
}

impl TimeSource {
    /// Short label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            TimeSource::Created => "created",
            TimeSource::Modified => "modified",
        }
    }
}

/// Resolved reference timestamp for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime {
    /// The chosen timestamp
    pub timestamp: DateTime<Utc>,
    /// Where it came from
    pub source: TimeSource,
}

impl ReferenceTime {
    /// Format the timestamp for display in the given zone
    pub fn display(&self, zone: DisplayZone) -> String {
        match zone {
            DisplayZone::Local => self
                .timestamp
                .with_timezone(&Local)
                .format(LABEL_TIME_FORMAT)
                .to_string(),
            DisplayZone::Utc => self.timestamp.format(LABEL_TIME_FORMAT).to_string(),
        }
    }
}

/// Resolve the reference timestamp of a file from its metadata
///
/// A missing creation time falls back to the modification time, which every
/// supported platform records. Fails only when that timestamp cannot be
/// represented as a calendar date.
pub fn resolve_reference_time(path: &Path, metadata: &Metadata) -> Result<ReferenceTime> {
    choose_reference_time(
        path,
        os::creation_time(metadata),
        os::modification_time(metadata),
    )
}

/// Pick between creation and modification time
///
/// The creation time wins unless it is absent, the zero sentinel, or out of
/// range. Falling back always emits a warning naming the file.
pub fn choose_reference_time(
    path: &Path,
    created: Option<FileTime>,
    modified: FileTime,
) -> Result<ReferenceTime> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if let Some(timestamp) = created
        .filter(|t| *t != FileTime::zero())
        .and_then(to_utc)
    {
        debug!(file = %file_name, %timestamp, "Using creation time");
        return Ok(ReferenceTime {
            timestamp,
            source: TimeSource::Created,
        });
    }

    warn!(
        file = %file_name,
        "Creation time unavailable, using modification time"
    );

    let timestamp = to_utc(modified).ok_or_else(|| Error::TimestampOutOfRange {
        path: path.to_path_buf(),
    })?;

    Ok(ReferenceTime {
        timestamp,
        source: TimeSource::Modified,
    })
}

fn to_utc(time: FileTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.unix_seconds(), time.nanoseconds())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Captures formatted `tracing` output for assertions.

    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        /// Run `f` with a subscriber that records into this buffer
        pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
            let subscriber = tracing_subscriber::fmt()
                .with_writer(self.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::DEBUG)
                .finish();
            tracing::subscriber::with_default(subscriber, f)
        }
    }

    impl io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogCapture {
        type Writer = LogCapture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::LogCapture;
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_time_source_label() {
        assert_eq!(TimeSource::Created.label(), "created");
        assert_eq!(TimeSource::Modified.label(), "modified");
    }

    #[test]
    fn test_creation_time_preferred() {
        let created = FileTime::from_unix_time(1_700_000_000, 0);
        let modified = FileTime::from_unix_time(1_710_000_000, 0);

        let resolved = choose_reference_time(Path::new("a.jpg"), Some(created), modified).unwrap();
        assert_eq!(resolved.source, TimeSource::Created);
        assert_eq!(resolved.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_zero_sentinel_falls_back_with_warning() {
        let logs = LogCapture::default();
        let modified = FileTime::from_unix_time(1_710_000_000, 500);

        let resolved = logs
            .capture(|| {
                choose_reference_time(Path::new("IMG_0042.png"), Some(FileTime::zero()), modified)
            })
            .unwrap();

        assert_eq!(resolved.source, TimeSource::Modified);
        assert_eq!(resolved.timestamp.timestamp(), 1_710_000_000);

        let output = logs.contents();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("IMG_0042.png"), "{output}");
        assert!(output.contains("modification time"), "{output}");
    }

    #[test]
    fn test_missing_creation_time_falls_back() {
        let logs = LogCapture::default();
        let modified = FileTime::from_unix_time(86_400, 0);

        let resolved = logs
            .capture(|| choose_reference_time(Path::new("b.jpg"), None, modified))
            .unwrap();

        assert_eq!(resolved.source, TimeSource::Modified);
        assert_eq!(resolved.timestamp.timestamp(), 86_400);
        assert!(logs.contents().contains("WARN"));
    }

    #[test]
    fn test_out_of_range_modification_time_is_an_error() {
        let logs = LogCapture::default();
        let modified = FileTime::from_unix_time(i64::MAX, 0);

        let err = logs
            .capture(|| choose_reference_time(Path::new("/photos/far.png"), None, modified))
            .err()
            .unwrap();

        assert!(matches!(err, Error::TimestampOutOfRange { .. }));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("far.png"));
    }

    #[test]
    fn test_out_of_range_creation_time_falls_back() {
        let created = FileTime::from_unix_time(i64::MIN, 0);
        let modified = FileTime::from_unix_time(1_710_000_000, 0);

        let resolved = choose_reference_time(Path::new("c.jpg"), Some(created), modified).unwrap();
        assert_eq!(resolved.source, TimeSource::Modified);
    }

    #[test]
    fn test_resolve_from_real_file() {
        let file = NamedTempFile::new().unwrap();
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(file.path(), mtime).unwrap();

        let metadata = std::fs::metadata(file.path()).unwrap();
        let resolved = resolve_reference_time(file.path(), &metadata).unwrap();

        // Birth time support depends on the host filesystem
        match resolved.source {
            TimeSource::Created => assert!(resolved.timestamp.timestamp() > 1_600_000_000),
            TimeSource::Modified => assert_eq!(resolved.timestamp.timestamp(), 1_600_000_000),
        }
    }

    #[test]
    fn test_display_utc() {
        let resolved = ReferenceTime {
            timestamp: DateTime::from_timestamp(1_727_913_600, 0).unwrap(),
            source: TimeSource::Created,
        };
        assert_eq!(resolved.display(DisplayZone::Utc), "2024-10-03 00:00:00");
    }
}
