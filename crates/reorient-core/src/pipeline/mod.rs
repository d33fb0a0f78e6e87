//! Image re-orientation pipeline components.
//!
//! - **discovery**: Find image files under the input root
//! - **validate**: Pre-processing checks (size, magic bytes)
//! - **metadata**: Read the EXIF orientation tag
//! - **decode**: Load and decode pixels
//! - **encode**: Encode the rotated image and persist it
//! - **processor**: Runs the stages above for one item
//! - **queue**: The shared work queue and its cancel handle
//! - **pool**: Workers that drain the queue concurrently

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod metadata;
pub mod pool;
pub mod processor;
pub mod queue;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use encode::ImageEncoder;
pub use metadata::MetadataExtractor;
pub use pool::WorkerPool;
pub use processor::{ImageProcessor, ItemProcessor};
pub use queue::{CancelHandle, Next, WorkQueue};
pub use validate::Validator;
