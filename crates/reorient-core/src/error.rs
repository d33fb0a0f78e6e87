//! Error types for the reorient pipeline.
//!
//! Configuration errors are fatal and surface before any image is touched.
//! Pipeline errors belong to a single item: they are reported for that item
//! and never stop the rest of the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for reorient operations.
#[derive(Error, Debug)]
pub enum ReorientError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Report or other output I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Input directory does not exist
    #[error("Input directory does not exist: {0}")]
    InputNotFound(PathBuf),

    /// Input path exists but is not a directory
    #[error("Input path is not a directory: {0}")]
    InputNotADirectory(PathBuf),

    /// Input and output resolve to the same directory
    #[error("Input and output directories must be different: {0}")]
    SameDirectory(PathBuf),
}

/// Per-item pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Header does not match a supported container
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Orientation metadata could not be read
    #[error("Metadata extraction failed for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Encoding the rotated image failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Writing the output file failed
    #[error("Write error for {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another input already owns this item's output path
    #[error("{path} maps to {output}, which belongs to {owner}")]
    OutputCollision {
        path: PathBuf,
        output: PathBuf,
        owner: PathBuf,
    },

    /// Item is not under the input root it was discovered in
    #[error("{path} is not inside input root {root}")]
    OutsideInputRoot { path: PathBuf, root: PathBuf },
}

/// Convenience type alias for reorient results.
pub type Result<T> = std::result::Result<T, ReorientError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
