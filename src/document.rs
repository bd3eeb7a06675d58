//! Format-neutral output document.
//!
//! The mapper appends [`Element`]s to a [`Document`]; a writer
//! ([`crate::pipeline::docx`] or [`crate::pipeline::latex`]) serialises it
//! exactly once at the end of the run. Keeping the accumulator independent
//! of the target format lets every mapping rule be asserted on directly.

use serde::Serialize;
use std::path::PathBuf;

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// How a paragraph should be typeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphStyle {
    #[default]
    Normal,
    /// Monospaced, line breaks preserved.
    Code,
    /// Stand-in for content that could not be rendered.
    Placeholder,
}

/// A run of text. Embedded `\n` are hard line breaks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub style: ParagraphStyle,
    pub alignment: Alignment,
    /// Leave an empty line after this paragraph.
    pub spacing_after: bool,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self {
            style: ParagraphStyle::Code,
            ..Self::new(text)
        }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            style: ParagraphStyle::Placeholder,
            alignment: Alignment::Center,
            ..Self::new(text)
        }
    }

    pub fn with_spacing_after(mut self) -> Self {
        self.spacing_after = true;
        self
    }
}

/// A fixed-size grid of cell texts. Cells start blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<String>>,
    /// Leave an empty line after the table.
    pub spacing_after: bool,
}

impl TableGrid {
    /// Allocate a `rows` × `cols` grid of empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![String::new(); cols]; rows],
            spacing_after: false,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Set the text of cell (`row`, `col`). Returns `false` and leaves the
    /// grid unchanged when the coordinate is outside the grid.
    pub fn set(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = text.into();
                true
            }
            None => false,
        }
    }

    /// Cells of one row, left to right.
    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.cells.get(row).map(Vec::as_slice)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.iter().map(Vec::as_slice)
    }
}

/// A raster image on disk, placed centred in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Picture {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
}

/// One appended unit of output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    /// Document title (level 0 heading).
    Title { text: String },
    /// Section heading, level 1..=6.
    Heading { level: u8, text: String },
    Paragraph(Paragraph),
    Table(TableGrid),
    Picture(Picture),
}

/// The output accumulator. Append-only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_title(&mut self, text: impl Into<String>) {
        self.elements.push(Element::Title { text: text.into() });
    }

    /// Append a heading; `level` is clamped to 1..=6.
    pub fn add_heading(&mut self, level: u8, text: impl Into<String>) {
        self.elements.push(Element::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        });
    }

    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.elements.push(Element::Paragraph(paragraph));
    }

    pub fn add_table(&mut self, table: TableGrid) {
        self.elements.push(Element::Table(table));
    }

    pub fn add_picture(&mut self, picture: Picture) {
        self.elements.push(Element::Picture(picture));
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The first title element, if any.
    pub fn title(&self) -> Option<&str> {
        self.elements.iter().find_map(|e| match e {
            Element::Title { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn headings(&self) -> impl Iterator<Item = (u8, &str)> {
        self.elements.iter().filter_map(|e| match e {
            Element::Heading { level, text } => Some((*level, text.as_str())),
            _ => None,
        })
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.elements.iter().filter_map(|e| match e {
            Element::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableGrid> {
        self.elements.iter().filter_map(|e| match e {
            Element::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.elements.iter().filter_map(|e| match e {
            Element::Picture(p) => Some(p),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_starts_blank() {
        let grid = TableGrid::new(2, 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert!(grid.iter_rows().all(|r| r.iter().all(String::is_empty)));
    }

    #[test]
    fn grid_ignores_out_of_range_cells() {
        let mut grid = TableGrid::new(1, 2);
        assert!(grid.set(0, 1, "b"));
        assert!(!grid.set(0, 2, "c"));
        assert!(!grid.set(1, 0, "d"));
        assert_eq!(grid.row(0).unwrap(), &["".to_string(), "b".to_string()]);
        assert!(grid.row(5).is_none());
    }

    #[test]
    fn heading_level_is_clamped() {
        let mut doc = Document::new();
        doc.add_heading(0, "zero");
        doc.add_heading(9, "nine");
        let levels: Vec<u8> = doc.headings().map(|(l, _)| l).collect();
        assert_eq!(levels, vec![1, 6]);
    }

    #[test]
    fn placeholder_paragraph_is_centred() {
        let p = Paragraph::placeholder("[diagram]");
        assert_eq!(p.alignment, Alignment::Center);
        assert_eq!(p.style, ParagraphStyle::Placeholder);
    }

    #[test]
    fn title_lookup() {
        let mut doc = Document::new();
        assert_eq!(doc.title(), None);
        doc.add_title("Notes");
        doc.add_paragraph(Paragraph::new("body"));
        assert_eq!(doc.title(), Some("Notes"));
        assert_eq!(doc.len(), 2);
    }
}
