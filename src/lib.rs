//! # edgequake-pdfwatch
//!
//! Watch a folder for PDF documents and rasterise every page to PNG.
//!
//! Drop a document into the input directory; once it stops growing, its pages
//! are rendered in parallel by a fixed pool of workers, written as
//! `{name}_page_0001.png`, `{name}_page_0002.png`, … into the output
//! directory, and the document itself is moved to `processed/`, or to
//! `error/` if it could not be opened or any single page failed.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input/doc.pdf
//!  │
//!  ├─ 1. Watch      poll the input directory for new *.pdf files
//!  ├─ 2. Settle     wait until size and mtime stop changing
//!  ├─ 3. Count      open once, read the page count (spawn_blocking)
//!  ├─ 4. Schedule   one task per page, all submitted at once
//!  ├─ 5. Render     N isolated workers: read → rasterise ×2 → PNG
//!  ├─ 6. Aggregate  results back in page order, success iff 0 failures
//!  └─ 7. Archive    single rename into processed/ or error/
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfwatch::{Daemon, JobContext, PdfiumRenderer, PngEncoder, WatchConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(WatchConfig::builder().workers(4).build()?);
//!     let renderer = Arc::new(PdfiumRenderer::bind(None, None)?);
//!     let ctx = JobContext::new(config, renderer, Arc::new(PngEncoder));
//!
//!     let summary = Daemon::new(ctx)
//!         .run(async { tokio::signal::ctrl_c().await.ok(); })
//!         .await?;
//!     eprintln!("{} processed, {} failed", summary.processed, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfwatch` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod daemon;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{WatchConfig, WatchConfigBuilder};
pub use convert::{process_job, JobContext};
pub use daemon::{ensure_directories, Daemon, DaemonSummary};
pub use error::{JobError, MoveError, PageError, PdfWatchError, RenderError};
pub use output::{Job, JobReport, JobResult, Outcome, PageResult, PageTask};
pub use pipeline::encode::{ImageEncoder, PngEncoder};
pub use pipeline::render::{PageRenderer, PdfiumLibrary, PdfiumRenderer};
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
