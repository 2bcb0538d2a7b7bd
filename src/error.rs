//! Error types for the edgequake-pdfwatch library.
//!
//! Four error types reflect four distinct failure scopes:
//!
//! * [`PdfWatchError`] is **fatal**. The daemon cannot start or keep running
//!   (watch directory unreadable, pdfium library missing, bad config).
//!   Returned as `Err(PdfWatchError)` from startup functions.
//!
//! * [`JobError`] is **job-level**. One document cannot be opened at all.
//!   No page is attempted and the document is archived to the error folder.
//!
//! * [`PageError`] is **non-fatal**. A single page failed to open, render or
//!   encode. Stored inside [`crate::output::PageResult`] so sibling pages are
//!   never affected.
//!
//! * [`MoveError`]: the final rename into the processed/error folder failed.
//!   Logged; the document stays where it is.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by daemon startup and configuration.
#[derive(Debug, Error)]
pub enum PdfWatchError {
    /// The input directory could not be observed.
    #[error("Failed to start watching '{path}': {source}")]
    WatchStartFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One of the input/output/processed/error directories could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide,\n\
or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

}

/// A job-level failure: the document never reaches the scheduler.
#[derive(Debug, Error)]
pub enum JobError {
    /// The raw bytes could not be read from disk.
    #[error("Failed to read '{path}': {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes were read but do not parse as a document.
    #[error("Failed to open document '{path}': {detail}")]
    DocumentOpen { path: PathBuf, detail: String },
}

/// A failure scoped to one page task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// The worker could not re-open the source document.
    #[error("Page {page}: failed to open document: {detail}")]
    Open { page: usize, detail: String },

    /// Rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    Render { page: usize, detail: String },

    /// The pixel buffer could not be written as an image file.
    #[error("Page {page}: image encoding failed: {detail}")]
    Encode { page: usize, detail: String },

    /// The worker panicked or exited before reporting a result.
    #[error("Page {page}: worker lost: {detail}")]
    WorkerLost { page: usize, detail: String },
}

impl PageError {
    /// 1-based page number the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::Open { page, .. }
            | PageError::Render { page, .. }
            | PageError::Encode { page, .. }
            | PageError::WorkerLost { page, .. } => *page,
        }
    }
}

/// Archival failure.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The source path has no final component to reuse at the destination.
    #[error("Cannot archive '{path}': path has no file name")]
    NoFileName { path: PathBuf },

    /// The filesystem rename failed.
    #[error("Failed to move '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error returned by a [`crate::pipeline::render::PageRenderer`].
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The bytes are not a readable document.
    #[error("{0}")]
    Open(String),

    /// The document opened but the page could not be rasterised.
    #[error("{0}")]
    Page(String),
}
