//! Public media directory resolution and OS indexer notification.
//!
//! Synchronized files land in a fixed, well-known subfolder of the
//! platform's pictures directory so other applications can find them. The
//! IndexerNotifier trait is the seam to the platform's media indexing
//! service; the engine only ever issues best-effort rescan requests
//! through it.

use crate::error::SyncError;
use filetime::FileTime;
use std::path::{Path, PathBuf};

/// Name of the fixed subfolder created under the platform media directory.
pub const MEDIA_DIR_NAME: &str = "GallerySync";

/// Resolve the fixed destination root for synchronized files.
///
/// Falls back to the home directory, then to the current directory, on
/// platforms without a standard pictures location.
pub fn destination_root() -> PathBuf {
    let base = dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(MEDIA_DIR_NAME)
}

/// Asks the platform's media indexer to rescan a directory.
///
/// Implementations request a rescan; they cannot observe whether the scan
/// itself ever runs. Callers treat notification failures as non-fatal.
pub trait IndexerNotifier: Send + Sync {
    /// Request a rescan of `path`. The request is fire-and-forget.
    fn request_scan(&self, path: &Path) -> Result<(), SyncError>;
}

/// Default notifier for desktop platforms.
///
/// Bumps the directory modification time, which wakes any indexer
/// watching the filesystem for changes.
#[derive(Debug, Default)]
pub struct MtimeNotifier;

impl IndexerNotifier for MtimeNotifier {
    fn request_scan(&self, path: &Path) -> Result<(), SyncError> {
        filetime::set_file_mtime(path, FileTime::now()).map_err(|e| {
            SyncError::IndexerUnavailable {
                path: path.to_path_buf(),
                source: e,
            }
        })
    }
}
