//! Command surface for UI runtimes.
//!
//! `SyncService` owns the single subscriber slot and the indexer seam, and
//! exposes the two operations callers invoke: a bare gallery rescan and a
//! background synchronization run with progress reporting. Both return an
//! acceptance boolean (whether the request was well-formed and issued),
//! never whether the underlying work succeeded; outcomes arrive through
//! the subscribed event sink.

use crate::events::{ChannelSink, EventSink, SyncEvent};
use crate::media::{self, IndexerNotifier, MtimeNotifier};
use crate::sync::{create_sync, plan_sync, run_sync};
use crossbeam_channel::{unbounded, Receiver};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::warn;

/// The active subscriber slot, shared between the service and its worker
/// threads. Emitting while no subscriber is attached is a silent no-op.
#[derive(Clone, Default)]
struct SharedSink {
    inner: Arc<Mutex<Option<Box<dyn EventSink>>>>,
}

impl SharedSink {
    fn replace(&self, sink: Option<Box<dyn EventSink>>) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = sink;
        }
    }
}

impl EventSink for SharedSink {
    fn emit(&self, event: SyncEvent) {
        if let Ok(guard) = self.inner.lock() {
            if let Some(sink) = guard.as_ref() {
                sink.emit(event);
            }
        }
    }
}

/// Front door for the synchronization engine.
///
/// Holds the destination root, the indexer notifier, and one replaceable
/// event subscriber (last subscriber wins). Runs started here execute on
/// their own worker thread and cannot be cancelled once started.
pub struct SyncService {
    destination_root: PathBuf,
    notifier: Arc<dyn IndexerNotifier>,
    sink: SharedSink,
}

impl Default for SyncService {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncService {
    /// Service targeting the platform media directory with the default
    /// notifier.
    pub fn new() -> Self {
        Self::with_notifier(media::destination_root(), Arc::new(MtimeNotifier))
    }

    /// Service with an explicit destination root and the default notifier.
    pub fn with_destination(destination_root: impl Into<PathBuf>) -> Self {
        Self::with_notifier(destination_root, Arc::new(MtimeNotifier))
    }

    /// Service with an explicit destination root and indexer notifier.
    pub fn with_notifier(
        destination_root: impl Into<PathBuf>,
        notifier: Arc<dyn IndexerNotifier>,
    ) -> Self {
        SyncService {
            destination_root: destination_root.into(),
            notifier,
            sink: SharedSink::default(),
        }
    }

    /// The destination root runs started here copy into.
    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Attach a subscriber, replacing any previous one.
    ///
    /// The previous subscriber stops receiving events immediately, even if
    /// a run is in flight.
    pub fn subscribe(&self, sink: Box<dyn EventSink>) {
        self.sink.replace(Some(sink));
    }

    /// Attach a channel-backed subscriber and return its receiving end.
    ///
    /// Each run observed through the receiver is a finite sequence ending
    /// in exactly one terminal event. Dropping the receiver just detaches
    /// the subscription.
    pub fn subscribe_channel(&self) -> Receiver<SyncEvent> {
        let (tx, rx) = unbounded();
        self.subscribe(Box::new(ChannelSink::new(tx)));
        rx
    }

    /// Detach the current subscriber. Events emitted afterwards are dropped.
    pub fn unsubscribe(&self) {
        self.sink.replace(None);
    }

    /// Ask the platform indexer to rescan `path`.
    ///
    /// Returns whether the request was well-formed and issued, not whether
    /// the scan ran; notifier failures are logged and swallowed.
    pub fn scan_gallery(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        if let Err(e) = self.notifier.request_scan(Path::new(path)) {
            warn!(path, error = %e, "gallery scan request failed");
        }
        true
    }

    /// Start a synchronization run from `source_path` into the destination
    /// root on a background worker thread.
    ///
    /// Returns whether the request was well-formed and a run was started.
    /// Source validation happens inside the run: a missing source still
    /// returns true here and surfaces as an InvalidSource event on the
    /// subscribed sink.
    pub fn sync_with_progress(&self, source_path: &str) -> bool {
        if source_path.is_empty() {
            return false;
        }

        let source = PathBuf::from(source_path);
        let destination = self.destination_root.clone();
        let sink = self.sink.clone();
        let notifier = Arc::clone(&self.notifier);

        thread::spawn(move || {
            execute_sync(&source, &destination, &sink, notifier.as_ref());
        });
        true
    }
}

/// Drive one run to its terminal signal, reporting through `sink`.
///
/// Every early return delivers the corresponding Failed event, so each
/// run produces exactly one terminal signal.
fn execute_sync(
    source: &Path,
    destination_root: &Path,
    sink: &SharedSink,
    notifier: &dyn IndexerNotifier,
) {
    let mut run = match create_sync(source, destination_root) {
        Ok(run) => run,
        Err(e) => {
            warn!(source = %source.display(), error = %e, "rejected synchronization request");
            sink.emit(SyncEvent::failed(&e));
            return;
        }
    };

    if let Err(e) = plan_sync(&mut run) {
        warn!(source = %source.display(), error = %e, "failed to plan synchronization run");
        sink.emit(SyncEvent::failed(&e));
        return;
    }

    if let Err(e) = run_sync(&mut run, Some(sink), Some(notifier)) {
        sink.emit(SyncEvent::failed(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncErrorKind;
    use crate::events::ProgressEvent;
    use std::fs;
    use std::time::{Duration, Instant};

    const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Receive events until the run's terminal signal arrives.
    fn collect_run_events(rx: &Receiver<SyncEvent>) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        loop {
            let event = rx
                .recv_timeout(EVENT_TIMEOUT)
                .expect("timed out waiting for events");
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                return events;
            }
        }
    }

    fn terminal_progress(events: &[SyncEvent]) -> ProgressEvent {
        match events.last().expect("no events delivered") {
            SyncEvent::Progress(p) if p.completed => p.clone(),
            other => panic!("expected terminal progress event, got {:?}", other),
        }
    }

    #[test]
    fn test_sync_with_progress_two_file_scenario() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("Failed to create src dir");
        fs::create_dir(src.join("sub")).expect("Failed to create sub dir");
        fs::write(src.join("a.txt"), b"0123456789").expect("Failed to write a.txt");
        fs::write(src.join("sub").join("b.txt"), b"01234567890123456789")
            .expect("Failed to write b.txt");

        let dst = temp_dir.path().join("dst");
        let service = SyncService::with_destination(&dst);
        let rx = service.subscribe_channel();

        assert!(service.sync_with_progress(&src.to_string_lossy()));

        let events = collect_run_events(&rx);
        let progress: Vec<_> = events
            .iter()
            .map(|e| match e {
                SyncEvent::Progress(p) => p.clone(),
                SyncEvent::Failed { message, .. } => panic!("unexpected failure: {}", message),
            })
            .collect();

        // One event per file, then the terminal event.
        assert_eq!(progress.len(), 3);
        assert_eq!(progress[0].files_copied, 1);
        assert!(progress[0].bytes_copied == 10 || progress[0].bytes_copied == 20);

        let last = terminal_progress(&events);
        assert_eq!(last.files_copied, 2);
        assert_eq!(last.files_total, 2);
        assert_eq!(last.bytes_copied, 30);
        assert_eq!(last.bytes_total, 30);
        assert_eq!(last.fraction, 1.0);

        assert_eq!(
            fs::read(dst.join("a.txt")).expect("a.txt missing"),
            b"0123456789"
        );
        assert_eq!(
            fs::read(dst.join("sub").join("b.txt")).expect("b.txt missing"),
            b"01234567890123456789"
        );
    }

    #[test]
    fn test_sync_with_progress_missing_source_reports_invalid_source_only() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("nonexistent");
        let dst = temp_dir.path().join("dst");

        let service = SyncService::with_destination(&dst);
        let rx = service.subscribe_channel();

        // The argument is well-formed, so the request is accepted.
        assert!(service.sync_with_progress(&src.to_string_lossy()));

        let events = collect_run_events(&rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            SyncEvent::Failed { kind, .. } => assert_eq!(*kind, SyncErrorKind::InvalidSource),
            other => panic!("expected Failed event, got {:?}", other),
        }

        // Nothing trails the error and nothing was written.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!dst.exists());
    }

    #[test]
    fn test_sync_with_progress_empty_source_directory() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("Failed to create src dir");
        let dst = temp_dir.path().join("dst");

        let service = SyncService::with_destination(&dst);
        let rx = service.subscribe_channel();

        assert!(service.sync_with_progress(&src.to_string_lossy()));

        let events = collect_run_events(&rx);
        assert_eq!(events.len(), 1);

        let last = terminal_progress(&events);
        assert_eq!(last.files_total, 0);
        assert_eq!(last.files_copied, 0);
        assert_eq!(last.bytes_total, 0);
        assert_eq!(last.fraction, 1.0);
    }

    #[test]
    fn test_sync_with_progress_rejects_empty_argument() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let service = SyncService::with_destination(temp_dir.path().join("dst"));
        let rx = service.subscribe_channel();

        assert!(!service.sync_with_progress(""));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_rerun_overwrites_previous_copy() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("Failed to create src dir");
        let dst = temp_dir.path().join("dst");

        let service = SyncService::with_destination(&dst);

        fs::write(src.join("photo.jpg"), b"first version").expect("Failed to write file");
        let rx = service.subscribe_channel();
        assert!(service.sync_with_progress(&src.to_string_lossy()));
        collect_run_events(&rx);

        fs::write(src.join("photo.jpg"), b"second version").expect("Failed to rewrite file");
        let rx = service.subscribe_channel();
        assert!(service.sync_with_progress(&src.to_string_lossy()));
        let events = collect_run_events(&rx);

        assert!(terminal_progress(&events).completed);
        assert_eq!(
            fs::read(dst.join("photo.jpg")).expect("photo.jpg missing"),
            b"second version"
        );
    }

    #[test]
    fn test_last_subscriber_wins() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("Failed to create src dir");
        fs::write(src.join("file.txt"), b"data").expect("Failed to write file");
        let dst = temp_dir.path().join("dst");

        let service = SyncService::with_destination(&dst);
        let stale_rx = service.subscribe_channel();
        let live_rx = service.subscribe_channel();

        assert!(service.sync_with_progress(&src.to_string_lossy()));

        let events = collect_run_events(&live_rx);
        assert!(terminal_progress(&events).completed);

        // The replaced subscriber saw nothing.
        assert!(stale_rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribed_run_still_copies() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("Failed to create src dir");
        fs::write(src.join("file.txt"), b"data").expect("Failed to write file");
        let dst = temp_dir.path().join("dst");

        let service = SyncService::with_destination(&dst);
        let rx = service.subscribe_channel();
        service.unsubscribe();

        assert!(service.sync_with_progress(&src.to_string_lossy()));

        // Progress goes nowhere, but the copy itself must land.
        let deadline = Instant::now() + EVENT_TIMEOUT;
        while !dst.join("file.txt").exists() {
            assert!(Instant::now() < deadline, "copy never appeared");
            thread::sleep(Duration::from_millis(10));
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_scan_gallery_acceptance() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let service = SyncService::with_destination(temp_dir.path().join("dst"));

        assert!(!service.scan_gallery(""));
        // Issued, even though the path does not exist; scan failures are
        // swallowed.
        assert!(service.scan_gallery(&temp_dir.path().join("nope").to_string_lossy()));
        assert!(service.scan_gallery(&temp_dir.path().to_string_lossy()));
    }
}
