//! Page rasterisation behind the narrow [`PageRenderer`] seam.
//!
//! The pipeline only ever hands a renderer raw document bytes, and every call
//! builds its own pdfium instance and document handle inside the calling
//! blocking thread. [`PdfiumRenderer`] itself only stores where the library
//! lives, so no pdfium state ever crosses a worker boundary.
//!
//! With pdfium-render's `thread_safe` feature, pdfium access is serialised
//! behind one process-wide lock, so rasterisation itself runs one page at a
//! time. The pool still overlaps reading the source, converting pixels and
//! PNG encoding.
//!
//! [`PdfiumRenderer`] is the production implementation. Tests swap in a fake
//! renderer so the orchestration can be exercised without the native library.

use crate::error::{PdfWatchError, RenderError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rasterises documents supplied as raw bytes.
pub trait PageRenderer: Send + Sync {
    /// Open `bytes` just long enough to count its pages.
    fn page_count(&self, bytes: &[u8]) -> Result<usize, RenderError>;

    /// Render page `page_index` (0-based) at `scale` × its native size.
    fn render(
        &self,
        bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<DynamicImage, RenderError>;
}

/// Where the pdfium shared library is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfiumLibrary {
    /// An explicit library file.
    Path(PathBuf),
    /// The platform library name in the working directory.
    Local,
    /// The system library search path.
    System,
}

impl PdfiumLibrary {
    fn bind(&self) -> Result<Pdfium, PdfiumError> {
        let bindings = match self {
            PdfiumLibrary::Path(path) => Pdfium::bind_to_library(path)?,
            PdfiumLibrary::Local => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))?
            }
            PdfiumLibrary::System => Pdfium::bind_to_system_library()?,
        };
        Ok(Pdfium::new(bindings))
    }
}

/// pdfium-backed renderer.
#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    library: PdfiumLibrary,
    password: Option<String>,
}

impl PdfiumRenderer {
    /// Locate a pdfium library and check that it binds.
    ///
    /// With `lib_path` set, that exact library file is used. Otherwise a
    /// library in the working directory is tried first, then the system one.
    /// The trial instance is dropped immediately; each render call binds its own.
    pub fn bind(lib_path: Option<&Path>, password: Option<String>) -> Result<Self, PdfWatchError> {
        let candidates = match lib_path {
            Some(path) => vec![PdfiumLibrary::Path(path.to_path_buf())],
            None => vec![PdfiumLibrary::Local, PdfiumLibrary::System],
        };

        let mut last_error = String::from("no pdfium library candidates");
        for library in candidates {
            match library.bind() {
                Ok(_) => {
                    debug!("pdfium bound from {:?}", library);
                    return Ok(Self { library, password });
                }
                Err(e) => last_error = format!("{e:?}"),
            }
        }
        Err(PdfWatchError::PdfiumBindingFailed(last_error))
    }

    /// Library this renderer binds on every call.
    pub fn library(&self) -> &PdfiumLibrary {
        &self.library
    }

    fn pdfium(&self) -> Result<Pdfium, RenderError> {
        self.library
            .bind()
            .map_err(|e| RenderError::Open(format!("pdfium bind failed: {e:?}")))
    }
}

fn open<'a>(
    pdfium: &'a Pdfium,
    bytes: &'a [u8],
    password: Option<&str>,
) -> Result<PdfDocument<'a>, RenderError> {
    pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| RenderError::Open(format!("{e:?}")))
}

impl PageRenderer for PdfiumRenderer {
    fn page_count(&self, bytes: &[u8]) -> Result<usize, RenderError> {
        // Document and pdfium instance are dropped on every path out.
        let pdfium = self.pdfium()?;
        let document = open(&pdfium, bytes, self.password.as_deref())?;
        Ok(document.pages().len() as usize)
    }

    fn render(
        &self,
        bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<DynamicImage, RenderError> {
        let pdfium = self.pdfium()?;
        let document = open(&pdfium, bytes, self.password.as_deref())?;
        let pages = document.pages();

        let index = PdfPageIndex::try_from(page_index)
            .map_err(|_| RenderError::Page(format!("page index {page_index} out of range")))?;
        let page = pages
            .get(index)
            .map_err(|e| RenderError::Page(format!("{e:?}")))?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RenderError::Page(format!("{e:?}")))?;

        // Alpha carries nothing for a rendered page; keep the PNGs RGB.
        let image = DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8());
        debug!(
            "Rendered page {} → {}x{} px",
            page_index + 1,
            image.width(),
            image.height()
        );

        Ok(image)
    }
}
