//! # gallery-sync engine
//!
//! A small library for synchronizing an application-private directory into
//! the public media folder, with incremental progress reporting and
//! media-indexer notification.
//!
//! ## Overview
//!
//! The engine copies a directory tree, one file at a time, into a fixed
//! destination under the platform's media directory. It features:
//! - Recursive file enumeration with totals fixed before copying starts
//! - Per-file state tracking and error isolation
//! - Unconditional overwrite of existing destination files
//! - Progress events via a sink trait (decoupled from UI technology)
//! - Best-effort OS media-indexer notification after each run
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{SyncEvent, SyncService};
//!
//! let service = SyncService::new();
//! let events = service.subscribe_channel();
//!
//! // Fire-and-forget; outcomes arrive on the event stream.
//! service.sync_with_progress("/data/app/exports");
//!
//! for event in events.iter() {
//!     match &event {
//!         SyncEvent::Progress(p) => println!("{:.0}%", p.fraction * 100.0),
//!         SyncEvent::Failed { kind, message } => eprintln!("{}: {}", kind, message),
//!     }
//!     if event.is_terminal() {
//!         break;
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (SyncRun, FileEntry, enums)
//! - **error**: Error types and the caller-facing error taxonomy
//! - **events**: Progress events and the EventSink trait
//! - **fs_ops**: Low-level filesystem operations
//! - **media**: Destination-root resolution and indexer notification
//! - **sync**: Run lifecycle (create, plan, run)
//! - **service**: Command surface for UI runtimes

pub mod error;
pub mod events;
pub mod fs_ops;
pub mod media;
pub mod model;
pub mod service;
pub mod sync;

// Re-export main types and functions
pub use error::{SyncError, SyncErrorKind};
pub use events::{ChannelSink, EventSink, ProgressEvent, SyncEvent};
pub use media::{destination_root, IndexerNotifier, MtimeNotifier, MEDIA_DIR_NAME};
pub use model::{FileEntry, FileState, RunState, SyncRun};
pub use service::SyncService;
pub use sync::{create_sync, plan_sync, run_sync};
