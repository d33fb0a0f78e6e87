//! Per-item run reports in JSON or JSON Lines.
//!
//! Outcomes arrive in completion order, which differs between runs with
//! different worker counts; the writer sorts by input path so two reports
//! of the same tree compare equal.

use serde::Serialize;
use std::io::{self, Write};

use crate::error::{ReorientError, Result};
use crate::types::ItemOutcome;

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// A single JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl ReportFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Serializes item outcomes to a writer.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> ReportWriter<W> {
    /// Create a new report writer.
    ///
    /// `pretty` only affects the JSON array format.
    pub fn new(writer: W, format: ReportFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write every outcome, ordered by input path.
    pub fn write_outcomes(&mut self, outcomes: &[ItemOutcome]) -> Result<()> {
        let mut sorted: Vec<&ItemOutcome> = outcomes.iter().collect();
        sorted.sort_by(|a, b| a.input().cmp(b.input()));

        match self.format {
            ReportFormat::Json => {
                self.write_json(&sorted)?;
                self.items_written += sorted.len();
            }
            ReportFormat::JsonLines => {
                for outcome in sorted {
                    serde_json::to_writer(&mut self.writer, outcome).map_err(json_error)?;
                    writeln!(self.writer)?;
                    self.items_written += 1;
                }
            }
        }
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, value).map_err(json_error)?;
        } else {
            serde_json::to_writer(&mut self.writer, value).map_err(json_error)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    /// Get the number of outcomes written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// serde_json reports writer failures as its own error; keep those as I/O.
fn json_error(e: serde_json::Error) -> ReorientError {
    if e.is_io() {
        ReorientError::Io(io::Error::from(e))
    } else {
        ReorientError::Json(e)
    }
}
