//! Parallel page workers.
//!
//! ## Shape
//!
//! ```text
//!  tasks ──▶ stream::iter ──▶ spawn_blocking × k ──▶ buffered(k) ──▶ results
//!            (page order)     (k = workers)          (page order)
//! ```
//!
//! At most `workers` page tasks run at once, each on its own blocking thread.
//! Each task re-reads the source bytes and opens its own document, so no
//! document handle or buffer is shared. `buffered` yields results in the
//! order the tasks were submitted, no matter which task finished first.
//!
//! ## Isolation
//!
//! Open, render and encode failures become a failed [`PageResult`]. A task
//! that panics is reported as [`PageError::WorkerLost`] for its page; its
//! siblings keep running. `run` always returns exactly one result per task.

use crate::error::{PageError, RenderError};
use crate::output::{PageResult, PageTask};
use crate::pipeline::encode::ImageEncoder;
use crate::pipeline::render::PageRenderer;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, error};

/// A fixed-size pool of page-render workers.
#[derive(Clone)]
pub struct WorkerPool {
    workers: usize,
    scale: f32,
    renderer: Arc<dyn PageRenderer>,
    encoder: Arc<dyn ImageEncoder>,
}

impl WorkerPool {
    pub fn new(
        workers: usize,
        scale: f32,
        renderer: Arc<dyn PageRenderer>,
        encoder: Arc<dyn ImageEncoder>,
    ) -> Self {
        Self {
            workers: workers.max(1),
            scale,
            renderer,
            encoder,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every task and wait for all of them.
    ///
    /// Returns one result per task, in the order the tasks were given.
    pub async fn run(&self, tasks: Vec<PageTask>) -> Vec<PageResult> {
        if tasks.is_empty() {
            return Vec::new();
        }
        debug!(
            "Dispatching {} page tasks to {} workers",
            tasks.len(),
            self.workers.min(tasks.len())
        );

        stream::iter(tasks.into_iter().map(|task| {
            let renderer = Arc::clone(&self.renderer);
            let encoder = Arc::clone(&self.encoder);
            let scale = self.scale;
            async move {
                let page = task.page_num();
                let joined = tokio::task::spawn_blocking(move || {
                    render_page(&task, renderer.as_ref(), encoder.as_ref(), scale)
                })
                .await;
                joined.unwrap_or_else(|e| lost(page, e))
            }
        }))
        .buffered(self.workers)
        .collect()
        .await
    }
}

/// Failed result for a task whose blocking thread panicked or was cancelled.
fn lost(page: usize, e: JoinError) -> PageResult {
    let detail = if e.is_panic() {
        format!("task panicked: {}", panic_message(&*e.into_panic()))
    } else {
        format!("task cancelled: {e}")
    };
    error!("Page {} worker lost: {}", page, detail);
    PageResult::failed(PageError::WorkerLost { page, detail })
}

/// Open, render and persist one page.
pub fn render_page(
    task: &PageTask,
    renderer: &dyn PageRenderer,
    encoder: &dyn ImageEncoder,
    scale: f32,
) -> PageResult {
    let page = task.page_num();

    let bytes = match std::fs::read(&task.source) {
        Ok(bytes) => bytes,
        Err(e) => {
            return PageResult::failed(PageError::Open {
                page,
                detail: e.to_string(),
            })
        }
    };

    let image = match renderer.render(&bytes, task.page_index, scale) {
        Ok(image) => image,
        Err(RenderError::Open(detail)) => return PageResult::failed(PageError::Open { page, detail }),
        Err(RenderError::Page(detail)) => {
            return PageResult::failed(PageError::Render { page, detail })
        }
    };
    drop(bytes);

    let dest = task.output_path(encoder.extension());
    match encoder.write(&image, &dest) {
        Ok(()) => PageResult::saved(page, dest),
        Err(e) => PageResult::failed(PageError::Encode {
            page,
            detail: e.to_string(),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
