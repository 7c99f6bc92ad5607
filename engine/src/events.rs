//! Progress events and the sink they are delivered through.
//!
//! The EventSink trait decouples the engine from any particular UI
//! technology; a run emits into whatever sink the caller provides. A
//! detached subscriber is never an error: emitting into a dropped channel
//! receiver is a silent no-op.

use crate::error::{SyncError, SyncErrorKind};
use crate::model::SyncRun;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

/// Incremental status of one synchronization run.
///
/// One event is emitted per successfully copied file (completed = false),
/// followed by exactly one terminal event (completed = true, fraction 1.0)
/// unless the run fails first. The terminal event of an empty run also
/// reports fraction 1.0: zero files is a trivially complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// bytes_copied / bytes_total, or 0.0 while bytes_total is 0;
    /// always 1.0 on the terminal event
    pub fraction: f64,

    /// Files successfully copied so far
    pub files_copied: usize,

    /// Total files enumerated for this run, fixed before copying starts
    pub files_total: usize,

    /// Bytes successfully copied so far
    pub bytes_copied: u64,

    /// Total bytes enumerated for this run, fixed before copying starts
    pub bytes_total: u64,

    /// True only on the final event of a successful run
    pub completed: bool,
}

impl ProgressEvent {
    /// Snapshot of a run mid-copy.
    pub(crate) fn partial(run: &SyncRun) -> Self {
        ProgressEvent {
            fraction: run.fraction(),
            files_copied: run.files_copied,
            files_total: run.files.len(),
            bytes_copied: run.bytes_copied,
            bytes_total: run.bytes_total,
            completed: false,
        }
    }

    /// Terminal snapshot of a finished run.
    pub(crate) fn terminal(run: &SyncRun) -> Self {
        ProgressEvent {
            fraction: 1.0,
            files_copied: run.files_copied,
            files_total: run.files.len(),
            bytes_copied: run.bytes_copied,
            bytes_total: run.bytes_total,
            completed: true,
        }
    }
}

/// An item of a run's event stream.
///
/// Each run produces a finite sequence of these: zero or more
/// non-terminal Progress events, then either a terminal Progress event or
/// one Failed event. Nothing follows a Failed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncEvent {
    /// Copy progress, possibly terminal (see ProgressEvent::completed)
    Progress(ProgressEvent),

    /// The run failed; always the last event of its run
    Failed { kind: SyncErrorKind, message: String },
}

impl SyncEvent {
    /// Build the failure event for a run-level error.
    pub fn failed(err: &SyncError) -> Self {
        SyncEvent::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Returns true if no further events can follow this one.
    pub fn is_terminal(&self) -> bool {
        match self {
            SyncEvent::Progress(progress) => progress.completed,
            SyncEvent::Failed { .. } => true,
        }
    }
}

/// Trait for receiving events from a synchronization run.
///
/// Implement this to observe run progress. All emissions happen
/// synchronously on the thread executing the run.
pub trait EventSink: Send {
    /// Called once per event, in stream order.
    fn emit(&self, event: SyncEvent);
}

/// An EventSink that forwards events into a crossbeam channel.
///
/// Dropping the receiving end detaches the subscriber; subsequent events
/// are discarded without error.
pub struct ChannelSink {
    sender: Sender<SyncEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<SyncEvent>) -> Self {
        ChannelSink { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }
}
