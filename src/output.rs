//! Result types returned by a conversion.

use crate::config::Variant;
use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How many blocks of each kind the parser produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCounts {
    pub headings: usize,
    pub paragraphs: usize,
    pub tables: usize,
    pub code_blocks: usize,
    pub diagrams: usize,
}

impl BlockCounts {
    pub fn total(&self) -> usize {
        self.headings + self.paragraphs + self.tables + self.code_blocks + self.diagrams
    }
}

/// A diagram that was replaced by the placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramFailure {
    /// 1-indexed position among the document's diagrams.
    pub index: usize,
    pub error: RenderError,
}

/// Summary of one conversion run.
///
/// Diagram failures are not fatal; they appear here instead of as an `Err`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub variant: Variant,
    pub blocks: BlockCounts,
    pub diagrams_rendered: usize,
    pub diagrams_placeholder: usize,
    pub diagram_failures: Vec<DiagramFailure>,
    pub duration_ms: u64,
}
