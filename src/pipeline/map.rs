//! Block mapping: one [`Block`] → one append on the output [`Document`].
//!
//! | Block     | `docx`            | `diagrams`             | `tables`                    | `latex`             |
//! |-----------|-------------------|------------------------|-----------------------------|---------------------|
//! | Heading   | paragraph         | heading                | heading                     | heading             |
//! | Paragraph | paragraph         | paragraph              | paragraph                   | paragraph           |
//! | Table     | paragraph of rows | table, widest row      | table, widest row, spaced   | table, header width |
//! | Code      | paragraph         | code paragraph         | code paragraph              | code paragraph      |
//! | Diagram   | paragraph of src  | picture or placeholder | placeholder, spaced         | placeholder         |
//!
//! Word variants strip inline Markdown; LaTeX keeps the text as written and
//! escapes it at write time.

use crate::config::Variant;
use crate::document::{Document, Paragraph, Picture, TableGrid};
use crate::pipeline::inline::strip_inline;
use crate::pipeline::parse::{Block, TableBlock};

/// Text shown where a diagram could not be rendered.
pub const DIAGRAM_PLACEHOLDER: &str =
    "[Flowchart omitted - see the diagram source in the original Markdown file]";

/// Append `block` to `doc` according to `variant`.
///
/// `picture` is the rendered image for a diagram block; it is only consulted
/// by [`Variant::Diagrams`], and `None` there means "use the placeholder".
pub fn map_block(doc: &mut Document, variant: Variant, block: Block, picture: Option<Picture>) {
    match variant {
        Variant::Docx => map_plain(doc, block),
        Variant::Diagrams => map_diagrams(doc, block, picture),
        Variant::Tables => map_tables(doc, block),
        Variant::Latex => map_latex(doc, block),
    }
}

fn map_plain(doc: &mut Document, block: Block) {
    let text = match block {
        Block::Heading { text, .. } | Block::Paragraph(text) => strip_inline(&text),
        Block::Table(table) => table
            .all_rows()
            .map(|row| {
                row.iter()
                    .map(|c| strip_inline(c))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Code { text, .. } => text,
        Block::Diagram { description, .. } => description,
    };
    doc.add_paragraph(Paragraph::new(text));
}

fn map_diagrams(doc: &mut Document, block: Block, picture: Option<Picture>) {
    match block {
        Block::Heading { level, text } => doc.add_heading(level, strip_inline(&text)),
        Block::Paragraph(text) => doc.add_paragraph(Paragraph::new(strip_inline(&text))),
        Block::Table(table) => doc.add_table(widest_row_grid(&table)),
        Block::Code { text, .. } => doc.add_paragraph(Paragraph::code(text)),
        Block::Diagram { .. } => match picture {
            Some(picture) => doc.add_picture(picture),
            None => doc.add_paragraph(Paragraph::placeholder(DIAGRAM_PLACEHOLDER)),
        },
    }
}

fn map_tables(doc: &mut Document, block: Block) {
    match block {
        Block::Heading { level, text } => doc.add_heading(level, strip_inline(&text)),
        Block::Paragraph(text) => doc.add_paragraph(Paragraph::new(strip_inline(&text))),
        Block::Table(table) => {
            let mut grid = widest_row_grid(&table);
            grid.spacing_after = true;
            doc.add_table(grid);
        }
        Block::Code { text, .. } => doc.add_paragraph(Paragraph::code(text)),
        Block::Diagram { .. } => {
            doc.add_paragraph(Paragraph::placeholder(DIAGRAM_PLACEHOLDER).with_spacing_after())
        }
    }
}

fn map_latex(doc: &mut Document, block: Block) {
    match block {
        Block::Heading { level, text } => doc.add_heading(level, text),
        Block::Paragraph(text) => doc.add_paragraph(Paragraph::new(text)),
        Block::Table(table) => {
            let cols = table.header.len();
            doc.add_table(fill_grid(&table, cols, str::to_string));
        }
        Block::Code { text, .. } => doc.add_paragraph(Paragraph::code(text)),
        Block::Diagram { .. } => doc.add_paragraph(Paragraph::placeholder(DIAGRAM_PLACEHOLDER)),
    }
}

/// Grid as wide as the widest row; shorter rows leave trailing cells blank.
fn widest_row_grid(table: &TableBlock) -> TableGrid {
    fill_grid(table, table.columns(), |c| strip_inline(c))
}

/// Allocate header + data rows × `cols` and copy cells by position, skipping
/// any cell beyond `cols`.
fn fill_grid(table: &TableBlock, cols: usize, cell_text: impl Fn(&str) -> String) -> TableGrid {
    let mut grid = TableGrid::new(table.row_count(), cols);
    for (r, row) in table.all_rows().enumerate() {
        for (c, cell) in row.iter().enumerate().take(cols) {
            grid.set(r, c, cell_text(cell));
        }
    }
    grid
}
