//! Run lifecycle: create, plan, and execute a synchronization run.
//!
//! A run moves through three phases:
//! - `create_sync` validates the source and builds a Pending run
//! - `plan_sync` enumerates the source tree and fixes the totals
//! - `run_sync` copies every entry sequentially, emitting progress events
//!
//! Individual file errors are recorded but do NOT stop the run; only
//! failures outside the copy loop terminate it early.

use crate::error::SyncError;
use crate::events::{EventSink, ProgressEvent, SyncEvent};
use crate::fs_ops;
use crate::media::IndexerNotifier;
use crate::model::{FileState, RunState, SyncRun};
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

/// Create a new synchronization run.
///
/// Validates that the source path exists and is a directory. The
/// destination root may not exist yet; it is created during execution.
///
/// # Errors
/// Returns SyncError if the source is missing, unreadable, or not a
/// directory. No partial work is performed and no events are emitted.
pub fn create_sync<P: AsRef<Path>>(source: P, destination_root: P) -> Result<SyncRun, SyncError> {
    let source = source.as_ref();
    let destination_root = destination_root.as_ref();

    match fs::metadata(source) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(SyncError::SourceNotADirectory {
                    path: source.to_path_buf(),
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SyncError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(SyncError::SourceAccessDenied {
                path: source.to_path_buf(),
                source: e,
            });
        }
    }

    Ok(SyncRun {
        id: Uuid::new_v4(),
        source_path: source.to_path_buf(),
        destination_root: destination_root.to_path_buf(),
        files: Vec::new(),
        state: RunState::Pending,
        bytes_total: 0,
        bytes_copied: 0,
        files_copied: 0,
        created_at: Utc::now(),
        started_at: None,
        finished_at: None,
    })
}

/// Plan a run by enumerating the source tree.
///
/// Populates `run.files` with every regular file under the source and
/// fixes `bytes_total`. Totals never change after this point, even if the
/// source directory mutates while the run executes.
///
/// # Errors
/// Returns SyncError if enumeration fails or the run is not Pending.
pub fn plan_sync(run: &mut SyncRun) -> Result<(), SyncError> {
    if run.state != RunState::Pending {
        return Err(SyncError::InvalidState {
            reason: format!("run must be Pending to plan; current state: {}", run.state),
        });
    }

    run.files = fs_ops::enumerate_files(&run.source_path, &run.destination_root)?;
    run.bytes_total = run.files.iter().map(|f| f.size).sum();

    debug!(
        run_id = %run.id,
        files = run.files.len(),
        bytes = run.bytes_total,
        "planned synchronization run"
    );

    Ok(())
}

/// Execute a run, copying every planned entry into the destination root.
///
/// Entries are copied sequentially, in enumeration order, overwriting any
/// existing destination file. After each successful copy one non-terminal
/// ProgressEvent is emitted into `sink`. A failed copy is recorded on its
/// entry and skipped in the counters; the run continues with the next
/// entry. Once all entries are processed the indexer is notified for the
/// destination root and exactly one terminal event (fraction 1.0,
/// completed = true) is emitted, regardless of per-file failures.
///
/// A run can only execute once; re-running a Completed run is an error.
///
/// # Errors
/// Returns SyncError only if the run is not Pending. Everything that can
/// fail after copying begins is either isolated per file or swallowed
/// (indexer notification), so an error event can never trail a progress
/// event within one run.
pub fn run_sync(
    run: &mut SyncRun,
    sink: Option<&dyn EventSink>,
    notifier: Option<&dyn IndexerNotifier>,
) -> Result<(), SyncError> {
    if run.state != RunState::Pending {
        return Err(SyncError::InvalidState {
            reason: format!("run must be Pending to execute; current state: {}", run.state),
        });
    }

    run.state = RunState::Running;
    run.started_at = Some(Utc::now());

    debug!(
        run_id = %run.id,
        source = %run.source_path.display(),
        destination = %run.destination_root.display(),
        "starting synchronization run"
    );

    // Best-effort: a failed root creation surfaces as per-file copy
    // failures below, not as a run-level abort.
    if let Err(e) = fs::create_dir_all(&run.destination_root) {
        warn!(
            path = %run.destination_root.display(),
            error = %e,
            "failed to create destination root"
        );
    }

    for index in 0..run.files.len() {
        let src_path = run.files[index].source_path.clone();
        let dst_path = run.files[index].destination_path.clone();

        run.files[index].state = FileState::Copying;
        match fs_ops::copy_file(&src_path, &dst_path) {
            Ok(bytes_written) => {
                run.files[index].state = FileState::Done;
                // Counters use the size fixed at plan time, so the fraction
                // stays within [0, 1] even if the source grew meanwhile.
                run.bytes_copied += run.files[index].size;
                run.files_copied += 1;

                debug!(
                    path = %src_path.display(),
                    bytes = bytes_written,
                    "copied file"
                );

                if let Some(sink) = sink {
                    sink.emit(SyncEvent::Progress(ProgressEvent::partial(run)));
                }
            }
            Err(e) => {
                warn!(path = %src_path.display(), error = %e, "file copy failed");
                run.files[index].state = FileState::Failed;
                run.files[index].error_code = e.raw_os_error();
                run.files[index].error_message = Some(e.to_string());
            }
        }
    }

    if let Some(notifier) = notifier {
        if let Err(e) = notifier.request_scan(&run.destination_root) {
            // Scan failure never fails the run.
            warn!(error = %e, "media indexer notification failed");
        }
    }

    run.state = RunState::Completed;
    run.finished_at = Some(Utc::now());

    if let Some(sink) = sink {
        sink.emit(SyncEvent::Progress(ProgressEvent::terminal(run)));
    }

    Ok(())
}
