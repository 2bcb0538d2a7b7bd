//! Fan-out: one [`PageTask`] per page, all submitted to the pool at once.

use crate::output::{Job, PageResult, PageTask};
use crate::pipeline::pool::WorkerPool;
use std::path::Path;
use tracing::info;

/// Build exactly `page_count` tasks covering pages `0..page_count`.
pub fn build_tasks(job: &Job, page_count: usize, output_dir: &Path) -> Vec<PageTask> {
    (0..page_count)
        .map(|page_index| PageTask {
            source: job.source.clone(),
            page_index,
            output_dir: output_dir.to_path_buf(),
            filename: job.filename.clone(),
        })
        .collect()
}

/// Submit the whole batch and wait until every task has a result.
pub async fn dispatch(tasks: Vec<PageTask>, pool: &WorkerPool) -> Vec<PageResult> {
    info!(
        "Starting parallel processing of {} pages on {} workers...",
        tasks.len(),
        pool.workers()
    );
    pool.run(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_task_per_page_contiguous() {
        let job = Job::new("in/book.pdf");
        let tasks = build_tasks(&job, 4, Path::new("out"));
        let indices: Vec<usize> = tasks.iter().map(|t| t.page_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(tasks.iter().all(|t| t.filename == "book.pdf"));
        assert!(tasks.iter().all(|t| t.output_dir == Path::new("out")));
    }

    #[test]
    fn zero_pages_zero_tasks() {
        let job = Job::new("in/empty.pdf");
        assert!(build_tasks(&job, 0, Path::new("out")).is_empty());
    }
}
