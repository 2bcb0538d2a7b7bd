//! CLI binary for edgequake-pdfwatch.
//!
//! A thin shim over the library crate that maps CLI flags to `WatchConfig`,
//! binds pdfium, and runs the daemon until Ctrl+C / SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfwatch::config::{
    DEFAULT_ERROR_DIR, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PROCESSED_DIR,
};
use edgequake_pdfwatch::{Daemon, JobContext, PdfiumRenderer, PngEncoder, WatchConfig};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Watch ./pdf_input with one worker per CPU core
  pdfwatch

  # Custom folders, 4 workers
  pdfwatch --input inbox --output pages --processed done --error failed -w 4

  # Slow network share: wait longer for uploads to finish
  pdfwatch --settle-ms 2000 --settle-timeout 600

LAYOUT:
  pdf_input/        drop documents here (watched, non-recursive)
  images_output/    {name}_page_0001.png, {name}_page_0002.png, …
  pdf_processed/    documents whose every page converted
  pdf_error/        documents that failed to open or lost a page

ENVIRONMENT VARIABLES:
  PDFWATCH_*        every flag has an env equivalent (see --help)
  PDFIUM_LIB_PATH   path to libpdfium; otherwise ./ then the system library
  RUST_LOG          overrides the log filter (e.g. edgequake_pdfwatch=debug)
"#;

/// Watch a folder and rasterise every page of each new PDF to PNG.
#[derive(Parser, Debug)]
#[command(
    name = "pdfwatch",
    version,
    about = "Watch a folder and rasterise every page of each new PDF to PNG",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory to watch for new documents.
    #[arg(long, env = "PDFWATCH_INPUT", default_value = DEFAULT_INPUT_DIR)]
    input: PathBuf,

    /// Directory for rendered page images.
    #[arg(long, env = "PDFWATCH_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Archive for fully converted documents.
    #[arg(long, env = "PDFWATCH_PROCESSED", default_value = DEFAULT_PROCESSED_DIR)]
    processed: PathBuf,

    /// Archive for documents with any failure.
    #[arg(long, env = "PDFWATCH_ERROR", default_value = DEFAULT_ERROR_DIR)]
    error: PathBuf,

    /// Watched file extension.
    #[arg(long, env = "PDFWATCH_EXTENSION", default_value = "pdf")]
    extension: String,

    /// Number of parallel page workers. Default: one per CPU core.
    #[arg(short, long, env = "PDFWATCH_WORKERS")]
    workers: Option<usize>,

    /// Render scale factor relative to the page's native size.
    #[arg(long, env = "PDFWATCH_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Input directory scan interval in milliseconds.
    #[arg(long, env = "PDFWATCH_POLL_MS", default_value_t = 1000)]
    poll_ms: u64,

    /// Delay between file-stability samples in milliseconds.
    #[arg(long, env = "PDFWATCH_SETTLE_MS", default_value_t = 500)]
    settle_ms: u64,

    /// Give up waiting for a file to settle after this many seconds.
    #[arg(long, env = "PDFWATCH_SETTLE_TIMEOUT", default_value_t = 60)]
    settle_timeout: u64,

    /// Give up waiting on a file that stays empty after this many seconds.
    #[arg(long, env = "PDFWATCH_EMPTY_TIMEOUT", default_value_t = 5)]
    empty_timeout: u64,

    /// Ignore documents already in the input directory at startup.
    #[arg(long, env = "PDFWATCH_SKIP_EXISTING")]
    skip_existing: bool,

    /// User password for encrypted documents.
    #[arg(long, env = "PDFWATCH_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Enable DEBUG-level logs.
    #[arg(short, long, env = "PDFWATCH_VERBOSE")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, env = "PDFWATCH_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(io::stdout)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = Arc::new(build_config(&cli)?);

    // ── Bind PDFium ──────────────────────────────────────────────────────
    let renderer = PdfiumRenderer::bind(cli.pdfium_lib.as_deref(), config.password.clone())
        .context("Failed to load the PDF engine")?;

    info!("STARTING PDF CONVERTER DAEMON");
    let ctx = JobContext::new(config, Arc::new(renderer), Arc::new(PngEncoder));

    // ── Run until interrupted ────────────────────────────────────────────
    let summary = Daemon::new(ctx)
        .run(shutdown_signal())
        .await
        .context("Daemon failed to start")?;

    info!(
        "Exiting: {} processed, {} failed, {} left queued",
        summary.processed, summary.failed, summary.left_queued
    );
    Ok(())
}

/// Map CLI args to `WatchConfig`.
fn build_config(cli: &Cli) -> Result<WatchConfig> {
    let mut builder = WatchConfig::builder()
        .input_dir(&cli.input)
        .output_dir(&cli.output)
        .processed_dir(&cli.processed)
        .error_dir(&cli.error)
        .extension(&cli.extension)
        .scale(cli.scale)
        .poll_interval(Duration::from_millis(cli.poll_ms))
        .settle_interval(Duration::from_millis(cli.settle_ms))
        .settle_timeout(Duration::from_secs(cli.settle_timeout))
        .empty_timeout(Duration::from_secs(cli.empty_timeout))
        .process_existing(!cli.skip_existing);

    if let Some(n) = cli.workers {
        builder = builder.workers(n);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }

    builder.build().context("Invalid configuration")
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, stopping watcher..."),
        _ = terminate => warn!("Received SIGTERM, stopping watcher..."),
    }
}
