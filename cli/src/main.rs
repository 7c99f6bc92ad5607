//! gallery-sync - command-line front end for the synchronization engine.
//!
//! Starts one synchronization run (or a bare media-indexer rescan) and
//! renders the run's event stream as progress output on stderr.

use clap::Parser;
use crossbeam_channel::Receiver;
use engine::{destination_root, ProgressEvent, SyncErrorKind, SyncEvent, SyncService};
use std::path::PathBuf;

/// gallery-sync - copy a directory tree into the public media folder
#[derive(Parser, Debug)]
#[command(name = "gallery-sync")]
#[command(version = "0.1.0")]
#[command(about = "Copy files into the public media folder with progress tracking")]
struct Args {
    /// Source directory to synchronize
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "scan",
        required_unless_present = "scan"
    )]
    src: Option<PathBuf>,

    /// Only ask the media indexer to rescan this directory
    #[arg(long, value_name = "PATH")]
    scan: Option<PathBuf>,

    /// Destination root (defaults to the platform media directory)
    #[arg(long, value_name = "PATH")]
    dest: Option<PathBuf>,

    /// Print a line for every progress event
    #[arg(long)]
    verbose: bool,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

fn print_progress_bar(percent: u32) -> String {
    let filled = ((percent / 5) as usize).min(20);
    let empty = 20 - filled;
    format!("[{}{}] {}%", "=".repeat(filled), " ".repeat(empty), percent)
}

fn render_progress(progress: &ProgressEvent) {
    let percent = (progress.fraction * 100.0) as u32;
    eprint!(
        "\rProgress: {} | {}/{} bytes",
        print_progress_bar(percent),
        format_bytes(progress.bytes_copied),
        format_bytes(progress.bytes_total)
    );
    let _ = std::io::Write::flush(&mut std::io::stderr());
}

/// Consume the event stream until the run's terminal signal.
fn drain_events(events: &Receiver<SyncEvent>, verbose: bool) -> Result<(), String> {
    loop {
        let event = events
            .recv()
            .map_err(|_| "event stream closed before the run finished".to_string())?;

        match event {
            SyncEvent::Progress(progress) if progress.completed => {
                eprintln!();
                eprintln!("Sync complete!");
                eprintln!(
                    "Summary: {} of {} files, {} copied",
                    progress.files_copied,
                    progress.files_total,
                    format_bytes(progress.bytes_copied)
                );

                let failed = progress.files_total - progress.files_copied;
                if failed > 0 {
                    return Err(format!(
                        "{} of {} files failed to copy",
                        failed, progress.files_total
                    ));
                }
                return Ok(());
            }
            SyncEvent::Progress(progress) => {
                if verbose {
                    eprintln!(
                        "[{:3}/{:3}] {} copied",
                        progress.files_copied,
                        progress.files_total,
                        format_bytes(progress.bytes_copied)
                    );
                } else {
                    render_progress(&progress);
                }
            }
            SyncEvent::Failed { kind, message } => {
                eprintln!();
                return Err(match kind {
                    SyncErrorKind::InvalidSource => format!("invalid source: {}", message),
                    SyncErrorKind::SyncFailure => format!("sync failed: {}", message),
                });
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let exit_code = match run_cli(&args) {
        Ok(()) => 0,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main CLI logic - separated for testability
fn run_cli(args: &Args) -> Result<(), String> {
    let dest = args.dest.clone().unwrap_or_else(destination_root);
    let service = SyncService::with_destination(&dest);

    if let Some(scan) = &args.scan {
        if !service.scan_gallery(&scan.to_string_lossy()) {
            return Err("scan path must not be empty".to_string());
        }
        eprintln!("Requested media index rescan of {}", scan.display());
        return Ok(());
    }

    let src = args
        .src
        .as_ref()
        .ok_or_else(|| "either --src or --scan is required".to_string())?;

    // Validate up front for a friendlier message than the event stream's.
    if !src.exists() {
        return Err(format!(
            "Source directory does not exist: {}",
            src.display()
        ));
    }
    if !src.is_dir() {
        return Err(format!("Source is not a directory: {}", src.display()));
    }

    let events = service.subscribe_channel();
    if !service.sync_with_progress(&src.to_string_lossy()) {
        return Err("source path must not be empty".to_string());
    }

    eprintln!("Synchronizing {} -> {}", src.display(), dest.display());
    drain_events(&events, args.verbose)
}
