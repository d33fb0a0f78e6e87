//! Encoding rotated images and persisting them to the output tree.

use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::PipelineError;
use crate::paths::ensure_parent_dir;

/// Encodes images into their output container and writes them to disk.
pub struct ImageEncoder;

impl ImageEncoder {
    /// Pick the container for an output file.
    ///
    /// Forced PNG wins. Otherwise the output extension decides, and the
    /// decoded format covers extensions `image` does not know.
    pub fn output_format(output: &Path, force_png: bool, decoded: ImageFormat) -> ImageFormat {
        if force_png {
            return ImageFormat::Png;
        }
        ImageFormat::from_path(output).unwrap_or(decoded)
    }

    /// Encode into memory so a failed encode never leaves a partial file.
    pub fn encode(
        image: DynamicImage,
        format: ImageFormat,
        output: &Path,
    ) -> Result<Vec<u8>, PipelineError> {
        let image = Self::prepare_for(image, format);
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, format)
            .map_err(|e| PipelineError::Encode {
                path: output.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(buffer.into_inner())
    }

    /// Create the destination directory and write the encoded bytes.
    ///
    /// Bytes land in a temporary file beside the destination, which is then
    /// renamed over it, so a failed write never leaves a truncated output.
    pub fn persist(output: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
        let write_error = |source: std::io::Error| PipelineError::Write {
            path: output.to_path_buf(),
            source,
        };

        ensure_parent_dir(output).map_err(write_error)?;
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(write_error)?;
        staged.write_all(bytes).map_err(write_error)?;
        staged.persist(output).map_err(|e| write_error(e.error))?;
        Ok(())
    }

    /// JPEG only carries 8-bit gray or RGB samples.
    fn prepare_for(image: DynamicImage, format: ImageFormat) -> DynamicImage {
        if format != ImageFormat::Jpeg {
            return image;
        }
        match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
            DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA8(_) => {
                DynamicImage::ImageLuma8(image.to_luma8())
            }
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn test_output_format_policy() {
        let jpg = Path::new("out/photo.JPG");
        assert_eq!(
            ImageEncoder::output_format(jpg, true, ImageFormat::Jpeg),
            ImageFormat::Png
        );
        assert_eq!(
            ImageEncoder::output_format(jpg, false, ImageFormat::Jpeg),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageEncoder::output_format(Path::new("out/scan.tiff"), false, ImageFormat::Jpeg),
            ImageFormat::Tiff
        );
    }

    #[test]
    fn test_jpeg_with_alpha_is_flattened() {
        let image = DynamicImage::new_rgba8(8, 8);
        let bytes =
            ImageEncoder::encode(image, ImageFormat::Jpeg, Path::new("out/a.jpg")).unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_png_keeps_alpha() {
        let image = DynamicImage::new_rgba8(5, 3);
        let bytes = ImageEncoder::encode(image, ImageFormat::Png, Path::new("out/a.png")).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (5, 3));
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_persist_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested/deeper/out.png");
        ImageEncoder::persist(&output, b"bytes").unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"bytes");
    }

    #[test]
    fn test_persist_replaces_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        std::fs::write(&output, b"a much longer previous output").unwrap();

        ImageEncoder::persist(&output, b"new").unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_persist_leaves_no_stray_files() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the output file should go
        let output = dir.path().join("taken.png");
        std::fs::create_dir(&output).unwrap();
        std::fs::write(output.join("keep"), b"x").unwrap();

        let err = ImageEncoder::persist(&output, b"bytes").unwrap_err();
        assert!(matches!(err, PipelineError::Write { .. }));

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("taken.png")]);
        assert!(output.is_dir());
    }
}
