//! Word writer: [`Document`] → `.docx` bytes via `docx-rs`.
//!
//! The package carries its own paragraph styles (`Title`, `Heading1`–`Heading6`,
//! `Code`) so headings show up in Word's navigation pane without relying on
//! a template. Pictures are scaled to a fixed width and keep their aspect
//! ratio; ones that would run past a page are shrunk to fit.

use crate::document::{Alignment, Document, Element, Paragraph, ParagraphStyle, Picture, TableGrid};
use crate::error::Md2DocError;
use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph as DocxParagraph, Pic, Run, RunFonts, Style,
    StyleType, Table, TableCell, TableRow,
};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

const EMU_PER_INCH: f32 = 914_400.0;
const EMU_PER_INCH_INT: u64 = 914_400;

/// Tallest picture that fits a page body, in inches.
const MAX_HEIGHT_INCHES: u64 = 9;

/// Usable text width on the default page, in twentieths of a point.
const TEXT_WIDTH_TWIPS: usize = 9_000;

const CODE_FONT: &str = "Courier New";

/// Half-point sizes for heading levels 1..=6.
const HEADING_SIZES: [usize; 6] = [32, 28, 26, 24, 22, 22];

/// Serialise `doc` into a `.docx` package.
///
/// `output` is only used for error messages.
pub fn build_docx(
    doc: &Document,
    image_width_inches: f32,
    output: &Path,
) -> Result<Vec<u8>, Md2DocError> {
    let mut docx = with_styles(Docx::new());

    for element in doc.elements() {
        docx = match element {
            Element::Title { text } => docx.add_paragraph(text_paragraph(text).style("Title")),
            Element::Heading { level, text } => {
                docx.add_paragraph(text_paragraph(text).style(&format!("Heading{level}")))
            }
            Element::Paragraph(p) => {
                let docx = docx.add_paragraph(paragraph(p));
                spaced(docx, p.spacing_after)
            }
            Element::Table(grid) => spaced(docx.add_table(table(grid)), grid.spacing_after),
            Element::Picture(pic) => docx.add_paragraph(picture(pic, image_width_inches, output)?),
        };
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| Md2DocError::DocxBuildFailed {
            path: output.to_path_buf(),
            detail: e.to_string(),
        })?;

    let bytes = buf.into_inner();
    debug!("Packed {} elements into {} bytes", doc.len(), bytes.len());
    Ok(bytes)
}

fn with_styles(docx: Docx) -> Docx {
    let mut docx = docx.add_style(
        Style::new("Title", StyleType::Paragraph)
            .name("Title")
            .size(56)
            .bold(),
    );
    for (i, size) in HEADING_SIZES.iter().enumerate() {
        let level = i + 1;
        docx = docx.add_style(
            Style::new(format!("Heading{level}"), StyleType::Paragraph)
                .name(format!("heading {level}"))
                .size(*size)
                .bold(),
        );
    }
    docx.add_style(
        Style::new("Code", StyleType::Paragraph)
            .name("Code")
            .size(20)
            .fonts(RunFonts::new().ascii(CODE_FONT).hi_ansi(CODE_FONT)),
    )
}

fn spaced(docx: Docx, spacing_after: bool) -> Docx {
    if spacing_after {
        docx.add_paragraph(DocxParagraph::new())
    } else {
        docx
    }
}

/// One run; `\n` becomes a line break.
fn text_paragraph(text: &str) -> DocxParagraph {
    let mut run = Run::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    DocxParagraph::new().add_run(run)
}

fn paragraph(p: &Paragraph) -> DocxParagraph {
    let mut para = text_paragraph(&p.text);
    if p.style == ParagraphStyle::Code {
        para = para.style("Code");
    }
    if p.alignment == Alignment::Center {
        para = para.align(AlignmentType::Center);
    }
    para
}

fn table(grid: &TableGrid) -> Table {
    let rows = grid
        .iter_rows()
        .map(|cells| {
            TableRow::new(
                cells
                    .iter()
                    .map(|c| TableCell::new().add_paragraph(text_paragraph(c)))
                    .collect(),
            )
        })
        .collect();
    let col_width = TEXT_WIDTH_TWIPS / grid.cols().max(1);
    Table::new(rows).set_grid(vec![col_width; grid.cols()])
}

fn picture(pic: &Picture, width_inches: f32, output: &Path) -> Result<DocxParagraph, Md2DocError> {
    let bytes = std::fs::read(&pic.path).map_err(|e| Md2DocError::DocxBuildFailed {
        path: output.to_path_buf(),
        detail: format!("cannot read diagram image {}: {e}", pic.path.display()),
    })?;
    let (w_emu, h_emu) = picture_size_emu(pic.width_px, pic.height_px, width_inches);
    let image = Pic::new_with_dimensions(bytes, pic.width_px, pic.height_px).size(w_emu, h_emu);
    Ok(DocxParagraph::new()
        .add_run(Run::new().add_image(image))
        .align(AlignmentType::Center))
}

/// Fixed width in EMU, height scaled by the pixel aspect ratio.
///
/// Pictures taller than [`MAX_HEIGHT_INCHES`] are shrunk to that height,
/// keeping the aspect ratio.
fn picture_size_emu(width_px: u32, height_px: u32, width_inches: f32) -> (u32, u32) {
    let w_emu = u64::from((width_inches * EMU_PER_INCH).round() as u32);
    if width_px == 0 || height_px == 0 {
        return (w_emu as u32, w_emu as u32);
    }
    let h_emu = w_emu * u64::from(height_px) / u64::from(width_px);
    let max_h = MAX_HEIGHT_INCHES * EMU_PER_INCH_INT;
    if h_emu <= max_h {
        return (w_emu as u32, h_emu as u32);
    }

    let scaled_w = (max_h * u64::from(width_px) / u64::from(height_px)).max(1);
    warn!(
        "Diagram of {}x{}px is taller than {} inches at {} inches wide; shrinking it to fit",
        width_px, height_px, MAX_HEIGHT_INCHES, width_inches
    );
    (scaled_w as u32, max_h as u32)
}
