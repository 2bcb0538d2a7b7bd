//! Data model: jobs, page tasks and their results.

use crate::error::{JobError, MoveError, PageError};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// One document's trip from detection to archival.
#[derive(Debug, Clone)]
pub struct Job {
    /// Where the document sits in the input directory.
    pub source: PathBuf,
    /// Final path component of `source`.
    pub filename: String,
    /// When the watcher first saw the file.
    pub discovered_at: SystemTime,
}

impl Job {
    /// Create a job for a freshly detected file.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source,
            filename,
            discovered_at: SystemTime::now(),
        }
    }
}

/// Render one page of a job. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    pub source: PathBuf,
    /// 0-based page index.
    pub page_index: usize,
    pub output_dir: PathBuf,
    pub filename: String,
}

impl PageTask {
    /// 1-based page number used in names and logs.
    pub fn page_num(&self) -> usize {
        self.page_index + 1
    }

    /// Deterministic output path for this page with the given image extension.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.output_dir
            .join(page_image_name(&self.filename, self.page_num(), extension))
    }
}

/// `{stem}_page_{page:04}.{ext}`; `page` is 1-based.
pub fn page_image_name(filename: &str, page_num: usize, extension: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    format!("{stem}_page_{page_num:04}.{extension}")
}

/// Outcome of one page task. Exactly one exists per [`PageTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// 1-based page number.
    pub page_num: usize,
    pub outcome: Result<PathBuf, PageError>,
}

impl PageResult {
    pub fn saved(page_num: usize, path: PathBuf) -> Self {
        Self {
            page_num,
            outcome: Ok(path),
        }
    }

    pub fn failed(error: PageError) -> Self {
        Self {
            page_num: error.page(),
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Fold of every [`PageResult`] of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub total_pages: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub elapsed: Duration,
}

impl JobResult {
    /// Partial success is not success.
    pub fn is_success(&self) -> bool {
        self.fail_count == 0
    }
}

/// Which archive a job belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Processed,
    Error,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Processed => "processed",
            Outcome::Error => "error",
        }
    }
}

/// Everything known about a job once it has been handled.
#[derive(Debug)]
pub struct JobReport {
    pub job: Job,
    /// `Err` when the document never reached the scheduler.
    pub result: Result<JobResult, JobError>,
    pub outcome: Outcome,
    /// Archive location, or the move failure that left the file in place.
    pub archived: Result<PathBuf, MoveError>,
    /// Wall time from the start of the open attempt to the archival attempt.
    pub elapsed: Duration,
}
