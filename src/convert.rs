//! Conversion entry points.
//!
//! One call converts one Markdown file with one [`Variant`] and writes one
//! output file. The run is strictly sequential: blocks are parsed lazily,
//! diagrams (for [`Variant::Diagrams`]) are rendered one at a time, and the
//! document is written once at the end.

use crate::config::{ConversionConfig, Variant};
use crate::document::{Document, Picture};
use crate::error::{Md2DocError, RenderError};
use crate::output::{BlockCounts, ConversionReport, DiagramFailure};
use crate::pipeline::diagram::{DiagramRenderer, MermaidInkRenderer, RenderedDiagram};
use crate::pipeline::parse::{Block, Blocks};
use crate::pipeline::{input, map, write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a Markdown file using the HTTP diagram renderer from `config`.
///
/// The output is written to `config.output_dir` under the variant's fixed
/// file name, replacing any existing file.
///
/// # Errors
/// Returns `Err(Md2DocError)` only for fatal errors:
/// - Source file missing, unreadable or not UTF-8
/// - Output could not be built or written
///
/// Diagram render failures are not errors; see
/// [`ConversionReport::diagram_failures`].
pub async fn convert(
    input: impl AsRef<Path>,
    variant: Variant,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2DocError> {
    let renderer = MermaidInkRenderer::from_config(config)?;
    convert_with_renderer(input, variant, config, &renderer).await
}

/// Convert a Markdown file with a caller-supplied diagram renderer.
pub async fn convert_with_renderer<R: DiagramRenderer>(
    input: impl AsRef<Path>,
    variant: Variant,
    config: &ConversionConfig,
    renderer: &R,
) -> Result<ConversionReport, Md2DocError> {
    let start = Instant::now();
    let input = input.as_ref();
    info!("Starting {} conversion: {}", variant, input.display());

    // ── Step 1: Read source ──────────────────────────────────────────────
    let text = input::read_source(input).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(input, variant);
    }

    // ── Step 2: Parse + map ──────────────────────────────────────────────
    let mut doc = Document::new();
    let title = config
        .title
        .clone()
        .unwrap_or_else(|| input::default_title(input));
    doc.add_title(title);

    let mut run = DiagramRun::default();
    let blocks = Blocks::new(&text).with_diagram_languages(&config.diagram_languages);
    for block in blocks {
        run.blocks.count(&block);
        let picture = match &block {
            Block::Diagram { description, .. } => {
                run.diagram(variant, description, renderer, config).await
            }
            _ => None,
        };
        map::map_block(&mut doc, variant, block, picture);
    }
    debug!(
        "Mapped {} blocks into {} elements",
        run.blocks.total(),
        doc.len()
    );

    // ── Step 3: Write output ─────────────────────────────────────────────
    let output = config.output_dir.join(variant.output_file_name());
    let result = write_document(&doc, variant, config, &output).await;

    // Temp images are only needed until the package is written.
    for diagram in run.rendered.drain(..) {
        let path = diagram.path().to_path_buf();
        if let Err(e) = diagram.close() {
            warn!("Failed to remove temporary image {}: {}", path.display(), e);
        }
    }
    result?;

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} -> {} ({} blocks, {}ms)",
        input.display(),
        output.display(),
        run.blocks.total(),
        duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&output);
    }

    Ok(ConversionReport {
        input: input.to_path_buf(),
        output,
        variant,
        blocks: run.blocks,
        diagrams_rendered: run.rendered_count,
        diagrams_placeholder: run.placeholders,
        diagram_failures: run.failures,
        duration_ms,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    variant: Variant,
    config: &ConversionConfig,
) -> Result<ConversionReport, Md2DocError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Md2DocError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, variant, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

impl BlockCounts {
    fn count(&mut self, block: &Block) {
        match block {
            Block::Heading { .. } => self.headings += 1,
            Block::Paragraph(_) => self.paragraphs += 1,
            Block::Table(_) => self.tables += 1,
            Block::Code { .. } => self.code_blocks += 1,
            Block::Diagram { .. } => self.diagrams += 1,
        }
    }
}

/// Per-run diagram bookkeeping. Owns the temp images until the save.
#[derive(Default)]
struct DiagramRun {
    blocks: BlockCounts,
    rendered: Vec<RenderedDiagram>,
    rendered_count: usize,
    placeholders: usize,
    failures: Vec<DiagramFailure>,
}

impl DiagramRun {
    /// Handle one diagram block, returning the picture to insert if any.
    async fn diagram<R: DiagramRenderer>(
        &mut self,
        variant: Variant,
        description: &str,
        renderer: &R,
        config: &ConversionConfig,
    ) -> Option<Picture> {
        let index = self.blocks.diagrams;
        if !variant.renders_diagrams() {
            // The plain variant keeps the source text; the others show a placeholder.
            if variant != Variant::Docx {
                self.placeholders += 1;
            }
            return None;
        }

        match render_diagram(renderer, index, description, config).await {
            Ok(diagram) => {
                let picture = diagram.picture();
                self.rendered.push(diagram);
                self.rendered_count += 1;
                Some(picture)
            }
            Err(error) => {
                self.placeholders += 1;
                self.failures.push(DiagramFailure { index, error });
                None
            }
        }
    }
}

async fn render_diagram<R: DiagramRenderer>(
    renderer: &R,
    index: usize,
    description: &str,
    config: &ConversionConfig,
) -> Result<RenderedDiagram, RenderError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_diagram_start(index);
    }

    let result = renderer.render(description).await;
    match &result {
        Ok(diagram) => {
            debug!(
                "Diagram {} rendered: {}x{}",
                index,
                diagram.width_px(),
                diagram.height_px()
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_diagram_complete(index, diagram.width_px(), diagram.height_px());
            }
        }
        Err(e) => {
            warn!("Diagram {} not rendered, using placeholder: {}", index, e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_diagram_error(index, &e.to_string());
            }
        }
    }
    result
}

async fn write_document(
    doc: &Document,
    variant: Variant,
    config: &ConversionConfig,
    output: &Path,
) -> Result<(), Md2DocError> {
    let bytes = write::serialize(doc, variant, config.image_width_inches, output)?;
    write::write_atomic(output, &bytes).await
}
