//! EXIF orientation extraction.

use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::PipelineError;
use crate::orientation::Orientation;

/// Reads the orientation tag from image files.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Read the orientation tag of the primary image.
    ///
    /// A container with no EXIF block, or an EXIF block with no usable
    /// orientation field, yields `Ok(None)`. A container that cannot be
    /// parsed at all is an error for this item.
    pub fn read_orientation(path: &Path) -> Result<Option<Orientation>, PipelineError> {
        let file = File::open(path).map_err(|e| PipelineError::Metadata {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {e}"),
        })?;
        let mut reader = BufReader::new(file);

        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                tracing::trace!("No EXIF data in {:?}", path);
                return Ok(None);
            }
            Err(e) => {
                return Err(PipelineError::Metadata {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        let raw = exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0));

        let orientation = raw.and_then(Orientation::from_tag);
        if let (Some(value), None) = (raw, orientation) {
            tracing::debug!("Ignoring out-of-range orientation {value} in {:?}", path);
        }
        Ok(orientation)
    }
}
