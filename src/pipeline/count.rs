//! Page counting: read the document once, open it, report its length.
//!
//! The bytes are read asynchronously; parsing happens in `spawn_blocking`
//! because the renderer is CPU-bound native code. The document handle lives
//! only inside the renderer call, so it is released whether parsing succeeds
//! or not.

use crate::error::{JobError, RenderError};
use crate::pipeline::render::PageRenderer;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Count the pages of the document at `path`.
///
/// # Errors
/// * [`JobError::DocumentRead`]: the file could not be read.
/// * [`JobError::DocumentOpen`]: the bytes are not a valid document.
pub async fn count_pages(
    path: &Path,
    renderer: &Arc<dyn PageRenderer>,
) -> Result<usize, JobError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| JobError::DocumentRead {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    let renderer = Arc::clone(renderer);
    let counted = tokio::task::spawn_blocking(move || renderer.page_count(&bytes))
        .await
        .map_err(|e| JobError::DocumentOpen {
            path: path.to_path_buf(),
            detail: format!("page count task panicked: {e}"),
        })?;

    counted.map_err(|e| JobError::DocumentOpen {
        path: path.to_path_buf(),
        detail: match e {
            RenderError::Open(d) | RenderError::Page(d) => d,
        },
    })
}
