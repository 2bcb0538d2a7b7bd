//! Progress-callback trait for job and page events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] through
//! [`crate::convert::JobContext::with_progress`] to observe jobs as the
//! daemon handles them: forward events to a metrics sink, a status file, or
//! an assertion in a test. The trait is `Send + Sync` so it can be shared
//! with the background daemon task.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfwatch::{JobProgressCallback, PageResult, output::Job};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct FailedPages(AtomicUsize);
//!
//! impl JobProgressCallback for FailedPages {
//!     fn on_page_result(&self, _job: &Job, result: &PageResult) {
//!         if !result.is_success() {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//! ```

use crate::output::{Job, JobReport, PageResult};
use std::sync::Arc;

/// Called by the pipeline as a job moves through its states.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Jobs are handled one at a time, and page results
/// are delivered in page order after the whole pool round has finished.
pub trait JobProgressCallback: Send + Sync {
    /// The job passed its settle period and is about to be opened.
    fn on_job_start(&self, job: &Job) {
        let _ = job;
    }

    /// The document opened and has `total_pages` pages.
    fn on_pages_counted(&self, job: &Job, total_pages: usize) {
        let _ = (job, total_pages);
    }

    /// One page's final outcome. Never called for a document that failed to open.
    fn on_page_result(&self, job: &Job, result: &PageResult) {
        let _ = (job, result);
    }

    /// The job reached a terminal state (archived, or left in place after a
    /// failed move).
    fn on_job_complete(&self, report: &JobReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::convert::JobContext`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;
