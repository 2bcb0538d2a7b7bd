//! Shared fixtures: a fake renderer that needs no native PDF engine.
//!
//! A fake document is a single text line:
//!
//! ```text
//! FAKEDOC pages=3 fail=2 panic=4 delay=1:80,2:40
//! ```
//!
//! * `pages`: page count
//! * `fail` : comma-separated 1-based pages whose render returns an error
//! * `panic`: comma-separated 1-based pages whose render panics
//! * `delay`: `page:millis` pairs slept before rendering that page
//!
//! Anything not starting with `FAKEDOC` fails to open.

#![allow(dead_code)]

use edgequake_pdfwatch::{
    Job, JobContext, JobProgressCallback, JobReport, PageRenderer, PageResult, PngEncoder,
    RenderError, WatchConfig,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Default)]
struct FakeDoc {
    pages: usize,
    fail: Vec<usize>,
    panic: Vec<usize>,
    delay: HashMap<usize, u64>,
}

fn parse(bytes: &[u8]) -> Result<FakeDoc, RenderError> {
    let text = std::str::from_utf8(bytes).map_err(|_| RenderError::Open("not utf-8".into()))?;
    let mut words = text.split_whitespace();
    if words.next() != Some("FAKEDOC") {
        return Err(RenderError::Open("missing FAKEDOC header".into()));
    }

    let mut doc = FakeDoc::default();
    for word in words {
        let (key, value) = word
            .split_once('=')
            .ok_or_else(|| RenderError::Open(format!("bad token {word}")))?;
        let list = || value.split(',').filter_map(|p| p.parse().ok()).collect::<Vec<usize>>();
        match key {
            "pages" => {
                doc.pages = value
                    .parse()
                    .map_err(|_| RenderError::Open("bad page count".into()))?
            }
            "fail" => doc.fail = list(),
            "panic" => doc.panic = list(),
            "delay" => {
                for pair in value.split(',') {
                    if let Some((p, ms)) = pair.split_once(':') {
                        if let (Ok(p), Ok(ms)) = (p.parse(), ms.parse()) {
                            doc.delay.insert(p, ms);
                        }
                    }
                }
            }
            _ => return Err(RenderError::Open(format!("unknown key {key}"))),
        }
    }
    Ok(doc)
}

/// Renderer over the fake document format, with call accounting.
#[derive(Default)]
pub struct FakeRenderer {
    pub count_calls: AtomicUsize,
    pub render_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub completion_order: Mutex<Vec<usize>>,
}

impl FakeRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl PageRenderer for FakeRenderer {
    fn page_count(&self, bytes: &[u8]) -> Result<usize, RenderError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        parse(bytes).map(|d| d.pages)
    }

    fn render(
        &self,
        bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<DynamicImage, RenderError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        let doc = parse(bytes)?;
        let page = page_index + 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = doc.delay.get(&page).copied().unwrap_or(5);
        std::thread::sleep(Duration::from_millis(delay));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if page_index >= doc.pages {
            return Err(RenderError::Page(format!("page {page} out of range")));
        }
        if doc.panic.contains(&page) {
            panic!("renderer crashed on page {page}");
        }
        self.completion_order.lock().unwrap().push(page);
        if doc.fail.contains(&page) {
            return Err(RenderError::Page(format!("corrupt content stream on page {page}")));
        }

        let side = (8.0 * scale) as u32;
        let shade = (page * 40 % 256) as u8;
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            side,
            side,
            Rgb([shade, shade, shade]),
        )))
    }
}

/// Records every callback invocation.
#[derive(Default)]
pub struct Recorder {
    pub started: Mutex<Vec<String>>,
    pub counted: Mutex<Vec<usize>>,
    pub pages: Mutex<Vec<(usize, bool)>>,
    pub completed: Mutex<Vec<String>>,
}

impl JobProgressCallback for Recorder {
    fn on_job_start(&self, job: &Job) {
        self.started.lock().unwrap().push(job.filename.clone());
    }

    fn on_pages_counted(&self, _job: &Job, total_pages: usize) {
        self.counted.lock().unwrap().push(total_pages);
    }

    fn on_page_result(&self, _job: &Job, result: &PageResult) {
        self.pages
            .lock()
            .unwrap()
            .push((result.page_num, result.is_success()));
    }

    fn on_job_complete(&self, report: &JobReport) {
        self.completed.lock().unwrap().push(report.job.filename.clone());
    }
}

/// Temp root with all four directories created.
pub struct Workspace {
    pub root: TempDir,
    pub config: Arc<WatchConfig>,
}

impl Workspace {
    pub fn new(workers: usize) -> Self {
        Self::with(|b| b.workers(workers))
    }

    pub fn with(
        f: impl FnOnce(edgequake_pdfwatch::WatchConfigBuilder) -> edgequake_pdfwatch::WatchConfigBuilder,
    ) -> Self {
        init_tracing();
        let root = tempfile::tempdir().unwrap();
        let builder = WatchConfig::rooted_at(root.path())
            .poll_interval(Duration::from_millis(50))
            .settle_interval(Duration::from_millis(30))
            .settle_timeout(Duration::from_secs(2));
        let config = Arc::new(f(builder).build().unwrap());
        edgequake_pdfwatch::ensure_directories(&config).unwrap();
        Self { root, config }
    }

    pub fn drop_document(&self, name: &str, content: &str) -> PathBuf {
        let path = self.config.input_dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn context(&self, renderer: Arc<FakeRenderer>) -> JobContext {
        JobContext::new(Arc::clone(&self.config), renderer, Arc::new(PngEncoder))
    }

    pub fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn outputs(&self) -> Vec<String> {
        Self::files_in(&self.config.output_dir)
    }

    pub fn inputs(&self) -> Vec<String> {
        Self::files_in(&self.config.input_dir)
    }

    pub fn processed(&self) -> Vec<String> {
        Self::files_in(&self.config.processed_dir)
    }

    pub fn errors(&self) -> Vec<String> {
        Self::files_in(&self.config.error_dir)
    }
}

/// Route pipeline logs through the test harness; `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Poll `check` every 20 ms until it returns true or `timeout` elapses.
pub async fn eventually(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
