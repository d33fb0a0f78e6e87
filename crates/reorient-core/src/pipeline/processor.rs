//! Single-item processing: read orientation, rotate, write the mirror copy.

use std::path::Path;
use std::sync::RwLock;

use crate::config::Config;
use crate::error::PipelineResult;
use crate::orientation::Rotation;
use crate::paths::{OutputClaims, PathMapper};
use crate::types::ProcessedItem;

use super::decode::{format_to_string, ImageDecoder};
use super::encode::ImageEncoder;
use super::metadata::MetadataExtractor;
use super::validate::Validator;

/// Anything the worker pool can hand a work item to.
///
/// Implementations run on blocking worker threads and must be shareable
/// across them.
pub trait ItemProcessor: Send + Sync + 'static {
    /// Process one item, producing exactly one output on success and none
    /// on failure.
    fn process(&self, path: &Path) -> PipelineResult<ProcessedItem>;
}

/// The image processor that re-orients one file.
pub struct ImageProcessor {
    validator: Validator,
    decoder: ImageDecoder,
    mapper: PathMapper,
    claims: RwLock<OutputClaims>,
}

impl ImageProcessor {
    /// Create a new image processor writing through `mapper`.
    pub fn new(config: &Config, mapper: PathMapper) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            mapper,
            claims: RwLock::new(OutputClaims::default()),
        }
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    /// Replace the output ownership table for the next run.
    pub fn set_claims(&self, claims: OutputClaims) {
        *self
            .claims
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = claims;
    }
}

impl ItemProcessor for ImageProcessor {
    fn process(&self, path: &Path) -> PipelineResult<ProcessedItem> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {:?}", path);

        let output = self.mapper.map(path)?;
        self.claims
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .check(path, &output)?;

        self.validator.validate(path)?;

        let orientation = MetadataExtractor::read_orientation(path)?;
        tracing::trace!("  Orientation: {:?}", orientation);

        let decoded = self.decoder.decode(path)?;
        tracing::trace!(
            "  Decoded: {}x{} {}",
            decoded.width,
            decoded.height,
            format_to_string(decoded.format)
        );

        let rotation = Rotation::resolve(orientation);
        let image = rotation.apply(decoded.image);

        let format =
            ImageEncoder::output_format(&output, self.mapper.force_png(), decoded.format);
        let (width, height) = (image.width(), image.height());
        let bytes = ImageEncoder::encode(image, format, &output)?;
        ImageEncoder::persist(&output, &bytes)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        tracing::debug!(
            "{} ({}x{}) ==> {} ==> {}° in {:?}",
            file_name,
            decoded.width,
            decoded.height,
            orientation.map_or_else(|| "none".to_string(), |o| o.to_string()),
            rotation.degrees(),
            start.elapsed()
        );

        Ok(ProcessedItem {
            input: path.to_path_buf(),
            output,
            orientation,
            rotation,
            width,
            height,
        })
    }
}
