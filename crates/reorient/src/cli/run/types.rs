//! CLI enum types for the run command.

use clap::ValueEnum;
use reorient_core::ReportFormat;

/// Report file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// A single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Json => write!(f, "json"),
            ReportKind::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<ReportKind> for ReportFormat {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Json => ReportFormat::Json,
            ReportKind::Jsonl => ReportFormat::JsonLines,
        }
    }
}
