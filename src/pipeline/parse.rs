//! Block parsing: Markdown text → lazy sequence of [`Block`]s.
//!
//! A single forward pass over lines with one line of lookahead. Recognised
//! structures, in priority order:
//!
//! 1. Fenced code (```` ```lang ```` … ```` ``` ````); diagram languages become
//!    [`Block::Diagram`]
//! 2. ATX headings (`#` … `######`, more hashes clamp to 6)
//! 3. Pipe tables: two or more consecutive lines starting with `|`; line 1 is
//!    the header, line 2 the separator (dropped), the rest are data rows
//! 4. Anything else that is not blank: one [`Block::Paragraph`] per line
//!
//! Malformed input is tolerated, never rejected: an unterminated fence runs to
//! the end of the input, and table rows keep the cell count they were written
//! with. Both cases are logged.

use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::str::Lines;
use tracing::{debug, warn};

/// One structurally classified unit of source content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    Table(TableBlock),
    Code { language: Option<String>, text: String },
    Diagram { language: String, description: String },
}

/// A pipe table as written in the source.
///
/// Rows are *not* normalised: each keeps the number of cells it was written
/// with. [`TableBlock::columns`] gives the widest row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Maximum cell count over the header and all data rows.
    pub fn columns(&self) -> usize {
        self.all_rows().map(<[String]>::len).max().unwrap_or(0)
    }

    /// Header followed by data rows.
    pub fn all_rows(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(self.header.as_slice()).chain(self.rows.iter().map(Vec::as_slice))
    }

    /// Header plus data rows.
    pub fn row_count(&self) -> usize {
        1 + self.rows.len()
    }
}

/// Parse `text` with the default diagram language (`mermaid`).
pub fn parse(text: &str) -> Blocks<'_> {
    Blocks::new(text)
}

/// Iterator over the blocks of a Markdown document.
///
/// Produced by [`parse`]. Consumes its input as it goes and cannot be rewound.
pub struct Blocks<'a> {
    lines: Peekable<Lines<'a>>,
    line_no: usize,
    diagram_languages: Vec<String>,
}

impl<'a> Blocks<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
            line_no: 0,
            diagram_languages: vec!["mermaid".to_string()],
        }
    }

    /// Replace the set of fence languages classified as diagrams.
    pub fn with_diagram_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.diagram_languages = languages
            .into_iter()
            .map(|l| l.as_ref().trim().to_ascii_lowercase())
            .collect();
        self
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line)
    }

    fn next_is_table_line(&mut self) -> bool {
        self.lines.peek().is_some_and(|l| is_table_line(l))
    }

    fn is_diagram_language(&self, language: &str) -> bool {
        let language = language.to_ascii_lowercase();
        self.diagram_languages.iter().any(|l| *l == language)
    }

    fn fence(&mut self, info: &str) -> Block {
        let start = self.line_no;
        let language = info.split_whitespace().next().map(str::to_string);

        let mut body: Vec<&str> = Vec::new();
        let mut closed = false;
        while let Some(line) = self.next_line() {
            if line.trim() == FENCE {
                closed = true;
                break;
            }
            body.push(line);
        }
        if !closed {
            warn!(
                "Unterminated code fence opened on line {}; treating the rest of the document as code",
                start
            );
        }
        let text = body.join("\n");

        match language {
            Some(lang) if self.is_diagram_language(&lang) => Block::Diagram {
                language: lang,
                description: text,
            },
            language => Block::Code { language, text },
        }
    }

    fn table(&mut self, header_line: &str) -> Block {
        let start = self.line_no;
        let header = split_cells(header_line);

        if let Some(separator) = self.next_line() {
            if !is_separator_row(separator) {
                debug!(
                    "Line {} follows a table header but is not a separator row; dropped",
                    self.line_no
                );
            }
        }

        let mut rows = Vec::new();
        while self.next_is_table_line() {
            let Some(line) = self.next_line() else { break };
            let cells = split_cells(line);
            if cells.len() != header.len() {
                debug!(
                    "Table row on line {} has {} cells, header has {}",
                    self.line_no,
                    cells.len(),
                    header.len()
                );
            }
            rows.push(cells);
        }

        debug!(
            "Table at line {}: {} data rows, {} columns",
            start,
            rows.len(),
            header.len()
        );
        Block::Table(TableBlock { header, rows })
    }
}

impl Iterator for Blocks<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        loop {
            let line = self.next_line()?;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            if let Some(info) = trimmed.strip_prefix(FENCE) {
                return Some(self.fence(info));
            }

            if let Some(caps) = RE_HEADING.captures(trimmed) {
                let level = caps[1].len().min(6) as u8;
                return Some(Block::Heading {
                    level,
                    text: caps[2].trim().to_string(),
                });
            }

            if is_table_line(trimmed) && self.next_is_table_line() {
                return Some(self.table(trimmed));
            }

            return Some(Block::Paragraph(trimmed.to_string()));
        }
    }
}

// ── Line classification ──────────────────────────────────────────────────────

const FENCE: &str = "```";

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+)\s+(.+)$").unwrap());

fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// A separator row contains only `|`, `-`, `:` and whitespace.
fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|')
        && trimmed
            .chars()
            .all(|c| c == '|' || c == '-' || c == ':' || c.is_whitespace())
}

/// Split a pipe-table line into trimmed cells, dropping one leading and one
/// trailing pipe.
fn split_cells(line: &str) -> Vec<String> {
    let t = line.trim();
    let t = t.strip_prefix('|').unwrap_or(t);
    let t = t.strip_suffix('|').unwrap_or(t);
    t.split('|').map(|c| c.trim().to_string()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────
