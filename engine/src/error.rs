//! Error types for the synchronization engine.
//!
//! The primary error type is `SyncError`, which represents run-level errors
//! that prevent a run from executing. Per-file copy failures are recorded
//! on the FileEntry struct, not as SyncError.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

/// Errors that can occur at the run level (preventing execution).
///
/// These errors are non-recoverable and terminate the run. Per-file errors
/// (read/write failures for one entry) are recorded in FileEntry and do not
/// appear here.
#[derive(Debug)]
pub enum SyncError {
    /// Source directory does not exist
    SourceNotFound { path: PathBuf },

    /// Source path exists but is not a directory
    SourceNotADirectory { path: PathBuf },

    /// Source directory is not accessible (permissions)
    SourceAccessDenied { path: PathBuf, source: io::Error },

    /// Failed to enumerate the source directory tree
    EnumerationFailed { path: PathBuf, source: io::Error },

    /// Failed to read from a source file
    ReadError { path: PathBuf, source: io::Error },

    /// Failed to write to a destination file
    WriteError { path: PathBuf, source: io::Error },

    /// Failed to create a directory
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// The media indexer could not be notified
    IndexerUnavailable { path: PathBuf, source: io::Error },

    /// Operation attempted on a run in the wrong lifecycle state
    InvalidState { reason: String },
}

/// The caller-facing error taxonomy.
///
/// Subscribers see exactly two kinds of failure; `SyncError::kind` projects
/// every internal variant onto one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncErrorKind {
    /// Source path missing, not a directory, or unreadable
    InvalidSource,
    /// Any failure outside the per-file copy loop
    SyncFailure,
}

impl Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSource => write!(f, "invalid source"),
            Self::SyncFailure => write!(f, "sync failure"),
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotFound { path } => {
                write!(f, "Source directory not found: {}", path.display())
            }
            Self::SourceNotADirectory { path } => {
                write!(f, "Source is not a directory: {}", path.display())
            }
            Self::SourceAccessDenied { path, .. } => {
                write!(f, "Source directory access denied: {}", path.display())
            }
            Self::EnumerationFailed { path, .. } => {
                write!(f, "Failed to enumerate directory: {}", path.display())
            }
            Self::ReadError { path, .. } => {
                write!(f, "Failed to read file: {}", path.display())
            }
            Self::WriteError { path, .. } => {
                write!(f, "Failed to write file: {}", path.display())
            }
            Self::DirectoryCreationFailed { path, .. } => {
                write!(f, "Failed to create directory: {}", path.display())
            }
            Self::IndexerUnavailable { path, .. } => {
                write!(f, "Failed to notify media indexer for: {}", path.display())
            }
            Self::InvalidState { reason } => {
                write!(f, "Invalid run state: {}", reason)
            }
        }
    }
}

impl Error for SyncError {}

impl SyncError {
    /// The two-kind taxonomy reported to event subscribers.
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            Self::SourceNotFound { .. }
            | Self::SourceNotADirectory { .. }
            | Self::SourceAccessDenied { .. } => SyncErrorKind::InvalidSource,
            _ => SyncErrorKind::SyncFailure,
        }
    }

    /// Extract the OS error code from this error, if available.
    pub fn raw_os_error(&self) -> Option<u32> {
        match self {
            Self::SourceAccessDenied { source, .. }
            | Self::EnumerationFailed { source, .. }
            | Self::ReadError { source, .. }
            | Self::WriteError { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::IndexerUnavailable { source, .. } => {
                source.raw_os_error().map(|e| e as u32)
            }
            _ => None,
        }
    }
}
