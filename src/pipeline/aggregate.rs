//! Fan-in: fold the ordered page results of a job into one [`JobResult`].

use crate::output::{Job, JobResult, PageResult};
use crate::progress::JobProgressCallback;
use std::time::Instant;
use tracing::{error, info};

/// Log every page outcome and summarise the job.
///
/// `results` must already be in submission order. They are consumed here, so
/// the pool round's paths and error strings are released before archival.
pub fn aggregate(
    job: &Job,
    results: Vec<PageResult>,
    started: Instant,
    progress: &dyn JobProgressCallback,
) -> JobResult {
    let total_pages = results.len();
    let mut success_count = 0;
    let mut fail_count = 0;

    for result in &results {
        match &result.outcome {
            Ok(path) => {
                info!("  Saved Page {} to {}", result.page_num, path.display());
                success_count += 1;
            }
            Err(e) => {
                error!("  Failed Page {}: {}", result.page_num, e);
                fail_count += 1;
            }
        }
        progress.on_page_result(job, result);
    }
    drop(results);

    JobResult {
        total_pages,
        success_count,
        fail_count,
        elapsed: started.elapsed(),
    }
}
