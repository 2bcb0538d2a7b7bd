//! Settle period: wait until a freshly detected file stops changing.
//!
//! A file is considered stable once two consecutive samples, taken
//! `settle_interval` apart, report the same non-zero length and modification
//! time. Writers that stall for longer than `settle_interval` can still fool
//! this check; `settle_timeout` bounds how long a file that never settles is
//! held back. A file that stays zero bytes is bounded by the shorter
//! `empty_timeout`, since it blocks every document queued behind it.

use crate::config::WatchConfig;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Result of waiting on a new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Two identical samples were observed.
    Stable,
    /// The file kept changing (or stayed empty) until the timeout.
    TimedOut,
    /// The file disappeared while settling.
    Vanished,
}

impl Stability {
    /// Whether the pipeline should pick the file up.
    pub fn should_process(self) -> bool {
        !matches!(self, Stability::Vanished)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sample {
    len: u64,
    modified: Option<SystemTime>,
}

/// Block until `path` is stable, has vanished, or `settle_timeout` elapsed.
pub async fn wait_until_stable(path: &Path, config: &WatchConfig) -> Stability {
    let deadline = Instant::now() + config.settle_timeout;
    let mut previous: Option<Sample> = None;
    let mut empty_since: Option<Instant> = None;

    loop {
        match tokio::fs::metadata(path).await {
            Ok(meta) => {
                let current = Sample {
                    len: meta.len(),
                    modified: meta.modified().ok(),
                };
                if current.len > 0 && previous == Some(current) {
                    debug!("{} settled at {} bytes", path.display(), current.len);
                    return Stability::Stable;
                }
                previous = Some(current);

                if current.len == 0 {
                    let since = *empty_since.get_or_insert_with(|| {
                        warn!(
                            "{} is empty; waiting up to {:?} for data",
                            path.display(),
                            config.empty_timeout.min(config.settle_timeout)
                        );
                        Instant::now()
                    });
                    if since.elapsed() >= config.empty_timeout {
                        warn!(
                            "{} still empty after {:?}; processing it as-is",
                            path.display(),
                            config.empty_timeout
                        );
                        return Stability::TimedOut;
                    }
                } else {
                    empty_since = None;
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{} disappeared before it settled", path.display());
                return Stability::Vanished;
            }
            Err(e) => {
                debug!("Cannot stat {} yet: {}", path.display(), e);
                previous = None;
            }
        }

        if Instant::now() >= deadline {
            warn!(
                "{} still changing after {:?}; processing it as-is",
                path.display(),
                config.settle_timeout
            );
            return Stability::TimedOut;
        }
        tokio::time::sleep(config.settle_interval).await;
    }
}
