//! Image persistence: `DynamicImage` → file on disk.
//!
//! PNG is lossless, so rendered text stays crisp. Each image is written to a
//! [`tempfile::NamedTempFile`] in the destination directory and persisted
//! (renamed) into place; an image only ever appears under its final name once
//! it is complete. A failed write leaves nothing behind.

use image::DynamicImage;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Persists a pixel buffer at a destination path.
pub trait ImageEncoder: Send + Sync {
    /// File extension (without dot) of the images this encoder writes.
    fn extension(&self) -> &str;

    /// Write `image` to `dest`, replacing any existing file.
    fn write(&self, image: &DynamicImage, dest: &Path) -> Result<(), image::ImageError>;
}

/// Lossless PNG encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn extension(&self) -> &str {
        "png"
    }

    fn write(&self, image: &DynamicImage, dest: &Path) -> Result<(), image::ImageError> {
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;

        let mut writer = BufWriter::new(tmp);
        image.write_to(&mut writer, image::ImageFormat::Png)?;
        writer.flush()?;
        let tmp = writer
            .into_inner()
            .map_err(|e| image::ImageError::IoError(e.into_error()))?;
        tmp.as_file().sync_all()?;

        tmp.persist(dest)
            .map_err(|e| image::ImageError::IoError(e.error))?;
        debug!("Wrote {}", dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn writes_valid_png_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("doc_page_0001.png");
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 6, Rgb([255, 0, 0])));

        PngEncoder.write(&img, &dest).expect("write should succeed");

        let decoded = image::open(&dest).expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (10, 6));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1, "temp file left behind: {names:?}");
    }

    #[test]
    fn existing_image_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a_page_0001.png");
        std::fs::write(&dest, b"stale").unwrap();

        let img = DynamicImage::ImageRgb8(RgbImage::new(3, 3));
        PngEncoder.write(&img, &dest).unwrap();
        assert_eq!(image::open(&dest).unwrap().width(), 3);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nope").join("x.png");
        let img = DynamicImage::ImageRgb8(RgbImage::new(1, 1));
        assert!(PngEncoder.write(&img, &dest).is_err());
    }
}
