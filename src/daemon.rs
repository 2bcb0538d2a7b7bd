//! Long-running daemon: watch, settle, process, archive, repeat.
//!
//! Two concurrency domains run side by side. The watch loop (a background
//! task) only enqueues detected paths. The job loop below takes one path at
//! a time, waits for it to settle, and runs it through
//! [`crate::convert::process_job`] to completion before looking at the next.
//!
//! Once a document has been archived its path is dropped from the watcher's
//! snapshot, so a new file dropped under the same name is picked up even if
//! no scan ran in between.
//!
//! Shutdown stops the watch loop. A document still in its settle period is
//! left in the input directory. A document already being rendered is drained
//! to archival first. Queued detections stay in the input directory and are
//! picked up again on the next start.

use crate::config::WatchConfig;
use crate::convert::{process_job, JobContext};
use crate::error::PdfWatchError;
use crate::output::{Job, Outcome};
use crate::pipeline::debounce;
use crate::pipeline::watch::DirectoryWatcher;
use std::future::Future;
use tracing::{info, warn};

/// Counts reported when the daemon stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DaemonSummary {
    /// Jobs archived to the processed directory.
    pub processed: usize,
    /// Jobs routed to the error directory (including failed moves).
    pub failed: usize,
    /// Detections still queued when shutdown was requested.
    pub left_queued: usize,
}

/// Create the input, output, processed and error directories if missing.
pub fn ensure_directories(config: &WatchConfig) -> Result<(), PdfWatchError> {
    for dir in config.directories() {
        std::fs::create_dir_all(dir).map_err(|source| PdfWatchError::DirectoryCreateFailed {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// The folder-watching daemon.
pub struct Daemon {
    ctx: JobContext,
}

impl Daemon {
    pub fn new(ctx: JobContext) -> Self {
        Self { ctx }
    }

    /// Run until `shutdown` resolves.
    ///
    /// # Errors
    /// Only startup failures are returned: directories that cannot be created
    /// or an input directory that cannot be watched. Job failures are logged
    /// and counted, never returned.
    pub async fn run<F>(self, shutdown: F) -> Result<DaemonSummary, PdfWatchError>
    where
        F: Future<Output = ()>,
    {
        let config = self.ctx.config();
        ensure_directories(config)?;

        let (watcher, mut events) = DirectoryWatcher::start(config).await?;
        info!("Watching for new documents in: {}", watcher.dir().display());
        info!(
            "Parallel workers: {} | extension: .{} | scale: {}x",
            config.workers, config.extension, config.scale
        );

        tokio::pin!(shutdown);
        let mut summary = DaemonSummary::default();

        loop {
            let path = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested; no new documents will be picked up");
                    break;
                }
                event = events.recv() => match event {
                    Some(path) => path,
                    None => break,
                },
            };

            let stability = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested; {} left in the input directory", path.display());
                    break;
                }
                s = debounce::wait_until_stable(&path, config) => s,
            };
            if !stability.should_process() {
                watcher.forget(&path);
                continue;
            }

            let report = process_job(Job::new(path), &self.ctx).await;
            if report.archived.is_ok() {
                watcher.forget(&report.job.source);
            }
            match (&report.archived, report.outcome) {
                (Ok(_), Outcome::Processed) => summary.processed += 1,
                _ => summary.failed += 1,
            }
        }

        watcher.stop().await;
        summary.left_queued = events.len();
        if summary.left_queued > 0 {
            info!(
                "{} queued documents left in the input directory",
                summary.left_queued
            );
        }
        info!(
            "Daemon stopped: {} processed, {} failed",
            summary.processed, summary.failed
        );
        Ok(summary)
    }
}
