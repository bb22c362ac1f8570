//! Platform-specific access to file timestamps.
//!
//! Only creation ("birth") time differs between platforms. Modification time
//! is available everywhere through `filetime`.

use filetime::FileTime;
use std::fs::Metadata;

/// Read the file creation time, if the platform and filesystem record one.
///
/// On Unix this goes through `statx`/`st_birthtime` via std; kernels or
/// filesystems without birth time support yield `None`.
#[cfg(unix)]
pub fn creation_time(metadata: &Metadata) -> Option<FileTime> {
    metadata.created().ok().map(FileTime::from_system_time)
}

/// Read the file creation time, if the platform and filesystem record one.
#[cfg(windows)]
pub fn creation_time(metadata: &Metadata) -> Option<FileTime> {
    FileTime::from_creation_time(metadata)
}

/// Read the file creation time, if the platform and filesystem record one.
#[cfg(not(any(unix, windows)))]
pub fn creation_time(_metadata: &Metadata) -> Option<FileTime> {
    None
}

/// Read the last modification time.
pub fn modification_time(metadata: &Metadata) -> FileTime {
    FileTime::from_last_modification_time(metadata)
}
