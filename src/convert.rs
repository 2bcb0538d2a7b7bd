//! Job pipeline entry point: one settled document, start to archive.
//!
//! ```text
//! discovered → counting → scheduled → rendering → aggregated ─┐
//!                  │                                          ├─▶ archived{processed|error}
//!                  └────────────── failed-early ──────────────┘
//! ```
//!
//! A document that cannot be opened never creates page tasks; it goes
//! straight to the error archive. Everything else is classified by its fail
//! count: one failed page is enough to route the document to error.

use crate::config::WatchConfig;
use crate::error::JobError;
use crate::output::{Job, JobReport, JobResult, Outcome};
use crate::pipeline::encode::ImageEncoder;
use crate::pipeline::pool::WorkerPool;
use crate::pipeline::render::PageRenderer;
use crate::pipeline::{aggregate, archive, count, schedule};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything a job needs, built once at startup and reused for every job.
#[derive(Clone)]
pub struct JobContext {
    config: Arc<WatchConfig>,
    renderer: Arc<dyn PageRenderer>,
    pool: WorkerPool,
    progress: ProgressCallback,
}

impl JobContext {
    pub fn new(
        config: Arc<WatchConfig>,
        renderer: Arc<dyn PageRenderer>,
        encoder: Arc<dyn ImageEncoder>,
    ) -> Self {
        let pool = WorkerPool::new(
            config.workers,
            config.scale,
            Arc::clone(&renderer),
            encoder,
        );
        Self {
            config,
            renderer,
            pool,
            progress: Arc::new(NoopProgressCallback),
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn progress(&self) -> &ProgressCallback {
        &self.progress
    }
}

/// Convert every page of `job` and archive the source document.
///
/// Never returns an error: every failure is captured in the [`JobReport`]
/// and logged, so the daemon keeps running whatever happens to one document.
pub async fn process_job(job: Job, ctx: &JobContext) -> JobReport {
    let started = Instant::now();
    info!("{}", "=".repeat(80));
    info!("STARTING CONVERSION FOR: {}", job.filename);
    info!("Using {} parallel workers", ctx.pool.workers());
    ctx.progress.on_job_start(&job);

    let result = convert_pages(&job, ctx, started).await;
    let outcome = match &result {
        Ok(r) if r.is_success() => Outcome::Processed,
        _ => Outcome::Error,
    };

    match &result {
        Ok(r) => {
            info!(
                "CONVERSION COMPLETE for {} in {:.2}s",
                job.filename,
                r.elapsed.as_secs_f64()
            );
            info!(
                "Success: {}/{} | Failed: {}/{}",
                r.success_count, r.total_pages, r.fail_count, r.total_pages
            );
        }
        Err(e) => error!(
            "PDF CONVERSION FAILED for {} after {:.2}s: {}",
            job.filename,
            started.elapsed().as_secs_f64(),
            e
        ),
    }

    let archived = archive::archive(&job.source, outcome, &ctx.config);
    match (&archived, outcome) {
        (Ok(dest), Outcome::Processed) => {
            info!("Moved {} to processed folder: {}", job.filename, dest.display())
        }
        (Ok(dest), Outcome::Error) => {
            error!("Moved {} to error folder: {}", job.filename, dest.display())
        }
        (Err(e), _) => error!(
            "Could not archive {} to {} folder: {}",
            job.filename,
            outcome.label(),
            e
        ),
    }

    let report = JobReport {
        job,
        result,
        outcome,
        archived,
        elapsed: started.elapsed(),
    };
    ctx.progress.on_job_complete(&report);
    report
}

/// counting → scheduled → rendering → aggregated.
async fn convert_pages(
    job: &Job,
    ctx: &JobContext,
    started: Instant,
) -> Result<JobResult, JobError> {
    let total_pages = count::count_pages(&job.source, &ctx.renderer).await?;
    info!("PDF opened. Pages: {}", total_pages);
    ctx.progress.on_pages_counted(job, total_pages);

    let tasks = schedule::build_tasks(job, total_pages, &ctx.config.output_dir);
    let results = schedule::dispatch(tasks, &ctx.pool).await;

    Ok(aggregate::aggregate(
        job,
        results,
        started,
        ctx.progress.as_ref(),
    ))
}
