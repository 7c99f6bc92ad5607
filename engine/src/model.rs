//! Core data model for synchronization runs.
//!
//! This module defines the main data structures for representing one run:
//! - SyncRun: a single source-to-media-directory copy operation
//! - FileEntry: a single file within a run
//! - RunState, FileState: enums tracking lifecycle

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use uuid::Uuid;

/// Represents a single synchronization run.
///
/// A SyncRun encompasses:
/// - The source directory and the resolved destination root
/// - All files discovered under the source
/// - Lifecycle state and progress counters
///
/// `bytes_total` and the entry list are fixed when the run is planned and
/// never change afterwards, even if the source mutates concurrently.
#[derive(Debug)]
pub struct SyncRun {
    /// Unique identifier for this run
    pub id: Uuid,

    /// Root source directory
    pub source_path: PathBuf,

    /// Root destination directory files are copied into
    pub destination_root: PathBuf,

    /// All files in this run, populated during planning
    pub files: Vec<FileEntry>,

    /// Current run state (Pending, Running, Completed)
    pub state: RunState,

    /// Total bytes to copy (sum of all entry sizes), fixed at plan time
    pub bytes_total: u64,

    /// Bytes copied so far (entry sizes of successfully copied files)
    pub bytes_copied: u64,

    /// Number of successfully copied files so far
    pub files_copied: usize,

    /// When the run was created
    pub created_at: DateTime<Utc>,

    /// When execution started
    pub started_at: Option<DateTime<Utc>>,

    /// When execution finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncRun {
    /// Fraction of bytes copied so far, in [0, 1].
    ///
    /// A run with nothing to copy reports 0.0 here; the terminal event of a
    /// finished run always reports 1.0 instead.
    pub fn fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            0.0
        } else {
            self.bytes_copied as f64 / self.bytes_total as f64
        }
    }
}

/// Represents a single regular file within a synchronization run.
///
/// Directories are not entries; they materialize at the destination through
/// parent-directory creation when their files are copied.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Unique identifier for this file within the run
    pub id: Uuid,

    /// Full source path
    pub source_path: PathBuf,

    /// Path relative to the source root
    pub relative_path: PathBuf,

    /// Full destination path
    pub destination_path: PathBuf,

    /// File size in bytes, captured at enumeration time
    pub size: u64,

    /// Current state of this file
    pub state: FileState,

    /// OS error code if state is Failed
    pub error_code: Option<u32>,

    /// Human-readable error message if state is Failed
    pub error_message: Option<String>,
}

/// The state of an individual file within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Not yet processed
    Pending,
    /// Currently copying
    Copying,
    /// Successfully copied
    Done,
    /// Error occurred; file not copied and not counted
    Failed,
}

impl FileState {
    /// Returns true if this state is terminal (no further changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, FileState::Done | FileState::Failed)
    }
}

/// The state of an entire synchronization run.
///
/// A run moves forward through these states exactly once; there is no way
/// back to Pending, which makes a run non-restartable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, not yet started
    Pending,
    /// Currently executing
    Running,
    /// All entries processed (some may have failed)
    Completed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Pending => write!(f, "Pending"),
            RunState::Running => write!(f, "Running"),
            RunState::Completed => write!(f, "Completed"),
        }
    }
}
