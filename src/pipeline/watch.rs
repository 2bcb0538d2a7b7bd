//! Directory watching by periodic snapshot.
//!
//! Every `poll_interval` the input directory is listed (non-recursively) and
//! compared with the previous listing. Paths that were not there before are
//! reported once as creation events. Paths that disappear are forgotten, so
//! a document dropped again under the same name is picked up again.
//!
//! A document can be archived and replaced by a new one of the same name
//! between two scans. The listing alone cannot tell the two apart, so the
//! consumer calls [`DirectoryWatcher::forget`] once a path has left the input
//! directory and the next scan reports the replacement as new.
//!
//! The watch loop only enqueues paths. It never waits on the pipeline, so
//! detections keep accumulating while a job is being rendered.

use crate::config::WatchConfig;
use crate::error::PdfWatchError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Handle to the background watch loop.
pub struct DirectoryWatcher {
    handle: JoinHandle<()>,
    dir: PathBuf,
    seen: SeenPaths,
}

type SeenPaths = Arc<Mutex<HashSet<PathBuf>>>;

fn lock(seen: &SeenPaths) -> MutexGuard<'_, HashSet<PathBuf>> {
    match seen.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl DirectoryWatcher {
    /// Start watching `config.input_dir`.
    ///
    /// Returns the watcher handle and the receiving end of the creation-event
    /// stream.
    ///
    /// # Errors
    /// [`PdfWatchError::WatchStartFailed`] if the directory cannot be listed.
    pub async fn start(
        config: &WatchConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PathBuf>), PdfWatchError> {
        let dir = config.input_dir.clone();
        let extension = config.extension.clone();

        let initial = scan_once(&dir, &extension)
            .await
            .map_err(|source| PdfWatchError::WatchStartFailed {
                path: dir.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut initial_seen: HashSet<PathBuf> = HashSet::new();
        for path in initial {
            if config.process_existing {
                info!("Found existing document: {}", path.display());
                let _ = tx.send(path.clone());
            }
            initial_seen.insert(path);
        }
        let seen: SeenPaths = Arc::new(Mutex::new(initial_seen));
        let loop_seen = Arc::clone(&seen);

        let mut ticker = tokio::time::interval(config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let loop_dir = dir.clone();

        let handle = tokio::spawn(async move {
            // The first tick completes immediately; the initial scan covered it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let current = match scan_once(&loop_dir, &extension).await {
                    Ok(paths) => paths,
                    Err(e) => {
                        warn!("Failed to scan {}: {}", loop_dir.display(), e);
                        continue;
                    }
                };

                let fresh = new_paths(&mut lock(&loop_seen), current);
                for path in fresh {
                    info!("New document detected: {}", path.display());
                    if tx.send(path).is_err() {
                        debug!("Event receiver dropped; stopping watcher");
                        return;
                    }
                }
            }
        });

        Ok((Self { handle, dir, seen }, rx))
    }

    /// Directory being watched.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Drop `path` from the last snapshot.
    ///
    /// Call once the document has been moved out of the input directory; a
    /// file later found under the same name is then reported again.
    pub fn forget(&self, path: &Path) {
        lock(&self.seen).remove(path);
    }

    /// Stop the watch loop. Events already queued stay in the receiver.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
        info!("Stopped watching {}", self.dir.display());
    }
}

/// List the regular files in `dir` whose extension matches, sorted by path.
pub async fn scan_once(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !has_watched_extension(&path, extension) {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => found.push(path),
            _ => {}
        }
    }
    found.sort();
    Ok(found)
}

/// Case-insensitive extension match; `extension` has no leading dot.
pub fn has_watched_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Paths in `current` not in `seen`; `seen` becomes `current`.
fn new_paths(seen: &mut HashSet<PathBuf>, current: Vec<PathBuf>) -> Vec<PathBuf> {
    let fresh: Vec<PathBuf> = current
        .iter()
        .filter(|p| !seen.contains(*p))
        .cloned()
        .collect();
    *seen = current.into_iter().collect();
    fresh
}
