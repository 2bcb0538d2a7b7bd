//! Configuration for the folder-watching daemon.
//!
//! Every knob lives in one immutable [`WatchConfig`], built once at startup via
//! [`WatchConfigBuilder`] and shared as `Arc<WatchConfig>` with each component.
//! Nothing reads ambient global state.

use crate::error::PdfWatchError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default watched directory.
pub const DEFAULT_INPUT_DIR: &str = "pdf_input";
/// Default directory for rendered page images.
pub const DEFAULT_OUTPUT_DIR: &str = "images_output";
/// Default archive for fully converted documents.
pub const DEFAULT_PROCESSED_DIR: &str = "pdf_processed";
/// Default archive for documents with at least one failure.
pub const DEFAULT_ERROR_DIR: &str = "pdf_error";
/// Default render scale (2× the page's native 72 DPI size).
pub const DEFAULT_SCALE: f32 = 2.0;

/// Immutable daemon configuration.
///
/// # Example
/// ```rust
/// use edgequake_pdfwatch::WatchConfig;
///
/// let config = WatchConfig::builder()
///     .input_dir("inbox")
///     .workers(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.workers, 4);
/// ```
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Directory observed for new documents (non-recursive).
    pub input_dir: PathBuf,

    /// Flat output directory for `{stem}_page_{NNNN}.png` files.
    pub output_dir: PathBuf,

    /// Archive for documents whose every page succeeded.
    pub processed_dir: PathBuf,

    /// Archive for documents that failed to open or lost at least one page.
    pub error_dir: PathBuf,

    /// Watched file extension, lowercase, without the leading dot. Default: `pdf`.
    pub extension: String,

    /// Number of page-render workers. Default: available hardware parallelism.
    pub workers: usize,

    /// Render scale factor. Default: 2.0.
    pub scale: f32,

    /// How often the input directory is scanned. Default: 1 s.
    pub poll_interval: Duration,

    /// Delay between two stability samples of a new file. Default: 500 ms.
    pub settle_interval: Duration,

    /// Give up waiting for a file to stop changing after this long and
    /// process it as-is. Default: 60 s.
    pub settle_timeout: Duration,

    /// Give up waiting on a file that stays zero bytes after this long and
    /// process it as-is. Default: 5 s.
    pub empty_timeout: Duration,
    /// Treat documents already sitting in the input directory at startup as
    /// new detections. Default: true.
    pub process_existing: bool,

    /// User password for encrypted documents.
    pub password: Option<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            error_dir: PathBuf::from(DEFAULT_ERROR_DIR),
            extension: "pdf".to_string(),
            workers: default_workers(),
            scale: DEFAULT_SCALE,
            poll_interval: Duration::from_secs(1),
            settle_interval: Duration::from_millis(500),
            settle_timeout: Duration::from_secs(60),
            empty_timeout: Duration::from_secs(5),
            process_existing: true,
            password: None,
        }
    }
}

impl WatchConfig {
    /// Create a new builder for `WatchConfig`.
    pub fn builder() -> WatchConfigBuilder {
        WatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config whose four directories live under `root`.
    ///
    /// Convenient for tests and for running several daemons side by side.
    pub fn rooted_at(root: impl AsRef<Path>) -> WatchConfigBuilder {
        let root = root.as_ref();
        Self::builder()
            .input_dir(root.join(DEFAULT_INPUT_DIR))
            .output_dir(root.join(DEFAULT_OUTPUT_DIR))
            .processed_dir(root.join(DEFAULT_PROCESSED_DIR))
            .error_dir(root.join(DEFAULT_ERROR_DIR))
    }

    /// The four directories the daemon owns, in creation order.
    pub fn directories(&self) -> [&Path; 4] {
        [
            &self.input_dir,
            &self.output_dir,
            &self.processed_dir,
            &self.error_dir,
        ]
    }
}

/// Number of hardware execution units, never less than one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builder for [`WatchConfig`].
#[derive(Debug)]
pub struct WatchConfigBuilder {
    config: WatchConfig,
}

impl WatchConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn processed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.processed_dir = dir.into();
        self
    }

    pub fn error_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.error_dir = dir.into();
        self
    }

    /// Accepts `pdf`, `.pdf` or `PDF`; stored as `pdf`.
    pub fn extension(mut self, ext: impl AsRef<str>) -> Self {
        self.config.extension = ext.as_ref().trim_start_matches('.').to_lowercase();
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn settle_interval(mut self, interval: Duration) -> Self {
        self.config.settle_interval = interval;
        self
    }

    pub fn settle_timeout(mut self, timeout: Duration) -> Self {
        self.config.settle_timeout = timeout;
        self
    }

    pub fn empty_timeout(mut self, timeout: Duration) -> Self {
        self.config.empty_timeout = timeout;
        self
    }

    pub fn process_existing(mut self, v: bool) -> Self {
        self.config.process_existing = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<WatchConfig, PdfWatchError> {
        let c = &self.config;
        if c.workers == 0 {
            return Err(PdfWatchError::InvalidConfig("workers must be ≥ 1".into()));
        }
        if !c.scale.is_finite() || !(0.1..=10.0).contains(&c.scale) {
            return Err(PdfWatchError::InvalidConfig(format!(
                "scale must be 0.1–10.0, got {}",
                c.scale
            )));
        }
        if c.extension.is_empty() {
            return Err(PdfWatchError::InvalidConfig(
                "extension must not be empty".into(),
            ));
        }
        if c.poll_interval.is_zero() || c.settle_interval.is_zero() {
            return Err(PdfWatchError::InvalidConfig(
                "poll and settle intervals must be non-zero".into(),
            ));
        }

        let dirs = c.directories();
        for (i, a) in dirs.iter().enumerate() {
            for b in &dirs[i + 1..] {
                if a == b {
                    return Err(PdfWatchError::InvalidConfig(format!(
                        "directory '{}' is used for two roles",
                        a.display()
                    )));
                }
            }
        }

        Ok(self.config)
    }
}
