//! Pixel decoding for the rotate stage.
//!
//! The container is sniffed from content, so a PNG saved as `.jpg` still
//! decodes. Dimensions are read from the header and checked against the
//! limit before any pixel buffer is allocated.

use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Decodes source images under a dimension limit.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// A decoded source image and the container it came from.
#[derive(Debug)]
pub struct DecodedImage {
    pub image: DynamicImage,
    /// Container detected from the file's content
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageDecoder {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode `path`, rejecting oversized images from their header alone.
    pub fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let (width, height) = Self::reader(path)?
            .into_dimensions()
            .map_err(|e| decode_error(path, format!("Cannot read image header: {e}")))?;

        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim,
            });
        }

        let reader = Self::reader(path)?;
        let format = reader.format().ok_or_else(|| PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?;
        let image = reader
            .decode()
            .map_err(|e| decode_error(path, e.to_string()))?;

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }

    fn reader(path: &Path) -> Result<ImageReader<BufReader<File>>, PipelineError> {
        ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| decode_error(path, format!("Cannot open file: {e}")))
    }
}

fn decode_error(path: &Path, message: String) -> PipelineError {
    PipelineError::Decode {
        path: path.to_path_buf(),
        message,
    }
}

/// Short lowercase name for log lines.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Tiff => "tiff",
        _ => "unknown",
    }
    .to_string()
}
