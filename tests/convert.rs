//! Integration tests for the conversion entry points.
//!
//! Every test writes into its own temporary directory via
//! `ConversionConfig::output_dir`, and diagram rendering goes through stub
//! renderers, so nothing here touches the network.

use image::{DynamicImage, Rgba, RgbaImage};
use md2doc::pipeline::diagram::store_image;
use md2doc::pipeline::map::DIAGRAM_PLACEHOLDER;
use md2doc::{
    convert, convert_sync, convert_with_renderer, ConversionConfig, ConversionProgressCallback,
    DiagramRenderer, Md2DocError, RenderError, RenderedDiagram, Variant,
};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

const SAMPLE: &str = "\
# Flight controller

Sensor fusion runs at 1 kHz.

| Sensor | Rate |
|--------|------|
| IMU | 1 kHz |
| Baro |

```c
void loop(void);
```

```mermaid
graph TD
  IMU --> EKF
```
";

fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn config_in(dir: &Path) -> ConversionConfig {
    ConversionConfig::builder()
        .output_dir(dir)
        .build()
        .unwrap()
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Renders every diagram as a small PNG and remembers the temp paths.
#[derive(Default)]
struct StubRenderer {
    calls: AtomicUsize,
    paths: Mutex<Vec<PathBuf>>,
}

impl DiagramRenderer for StubRenderer {
    async fn render(&self, _description: &str) -> Result<RenderedDiagram, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rendered = store_image(&png_bytes(40, 20))?;
        self.paths.lock().unwrap().push(rendered.path().to_path_buf());
        Ok(rendered)
    }
}

/// Always fails, like an unreachable endpoint.
#[derive(Default)]
struct FailingRenderer {
    calls: AtomicUsize,
}

impl DiagramRenderer for FailingRenderer {
    async fn render(&self, _description: &str) -> Result<RenderedDiagram, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RenderError::HttpStatus { status: 503 })
    }
}

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl ConversionProgressCallback for RecordingCallback {
    fn on_conversion_start(&self, _input: &Path, variant: Variant) {
        self.events.lock().unwrap().push(format!("start {variant}"));
    }
    fn on_diagram_start(&self, index: usize) {
        self.events.lock().unwrap().push(format!("diagram {index}"));
    }
    fn on_diagram_complete(&self, index: usize, width_px: u32, height_px: u32) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {index} {width_px}x{height_px}"));
    }
    fn on_diagram_error(&self, index: usize, _error: &str) {
        self.events.lock().unwrap().push(format!("error {index}"));
    }
    fn on_conversion_complete(&self, output: &Path) {
        let name = output.file_name().unwrap().to_string_lossy().to_string();
        self.events.lock().unwrap().push(format!("complete {name}"));
    }
}

fn read_tex(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("document.tex")).unwrap()
}

/// The main part of a written `.docx` package.
fn read_document_xml(path: &Path) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

/// Paragraph (`<w:p>`) in `xml` carrying the given style id.
fn styled_paragraph<'a>(xml: &'a str, style: &str) -> Option<&'a str> {
    let needle = format!("w:val=\"{style}\"");
    xml.split("</w:p>").find(|p| p.contains(&needle))
}

fn table_xml(xml: &str) -> &str {
    let start = xml.find("<w:tbl").expect("document has no table");
    let end = xml[start..].find("</w:tbl>").expect("unterminated table") + start;
    &xml[start..end]
}

const TABLE_AND_DIAGRAM: &str = "# Title\n\n| A | B |\n| - | - |\n| 1 | 2 |\n\n```mermaid\ngraph TD\n```\n";

// ── Variants ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn each_variant_writes_its_fixed_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "notes.md", SAMPLE);
    let config = config_in(dir.path());
    let renderer = StubRenderer::default();

    for variant in [
        Variant::Docx,
        Variant::Diagrams,
        Variant::Tables,
        Variant::Latex,
    ] {
        let report = convert_with_renderer(&input, variant, &config, &renderer)
            .await
            .unwrap();
        let expected = dir.path().join(variant.output_file_name());
        assert_eq!(report.output, expected);
        assert!(expected.exists(), "{variant} output missing");
        if variant.is_word() {
            let bytes = std::fs::read(&expected).unwrap();
            assert!(bytes.starts_with(b"PK"), "{variant} output is not a zip");
        }
    }

    // Only the diagrams variant talks to the renderer.
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn block_counts_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "notes.md", SAMPLE);
    let report = convert_with_renderer(
        &input,
        Variant::Tables,
        &config_in(dir.path()),
        &StubRenderer::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.blocks.headings, 1);
    assert_eq!(report.blocks.paragraphs, 1);
    assert_eq!(report.blocks.tables, 1);
    assert_eq!(report.blocks.code_blocks, 1);
    assert_eq!(report.blocks.diagrams, 1);
    assert_eq!(report.diagrams_placeholder, 1);
    assert_eq!(report.diagrams_rendered, 0);
}

#[tokio::test]
async fn rendered_diagrams_are_cleaned_up_after_save() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "notes.md", SAMPLE);
    let renderer = StubRenderer::default();

    let report = convert_with_renderer(&input, Variant::Diagrams, &config_in(dir.path()), &renderer)
        .await
        .unwrap();

    assert_eq!(report.diagrams_rendered, 1);
    assert!(report.diagram_failures.is_empty());
    let paths = renderer.paths.lock().unwrap();
    assert_eq!(paths.len(), 1);
    assert!(!paths[0].exists(), "temp image should be removed");
}

#[tokio::test]
async fn failing_renderer_falls_back_to_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "notes.md", SAMPLE);
    let renderer = FailingRenderer::default();

    let report = convert_with_renderer(&input, Variant::Diagrams, &config_in(dir.path()), &renderer)
        .await
        .unwrap();

    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.diagrams_rendered, 0);
    assert_eq!(report.diagrams_placeholder, 1);
    assert_eq!(report.diagram_failures.len(), 1);
    assert_eq!(report.diagram_failures[0].index, 1);
    assert!(matches!(
        report.diagram_failures[0].error,
        RenderError::HttpStatus { status: 503 }
    ));
    assert!(dir.path().join("document_diagrams.docx").exists());
}

// ── Word content ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn tables_variant_writes_heading_style_grid_and_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "doc.md", TABLE_AND_DIAGRAM);
    let report = convert(&input, Variant::Tables, &config_in(dir.path()))
        .await
        .unwrap();
    assert_eq!(report.diagrams_placeholder, 1);

    let xml = read_document_xml(&report.output);
    let heading = styled_paragraph(&xml, "Heading1").expect("no Heading1 paragraph");
    assert!(heading.contains(">Title</w:t>"));

    let table = table_xml(&xml);
    assert_eq!(table.matches("<w:gridCol").count(), 2);
    assert!(table.contains(">1</w:t>"));
    assert!(table.contains(">2</w:t>"));
    assert!(!xml.contains(">-</w:t>"), "separator row must be dropped");

    assert!(xml.contains(DIAGRAM_PLACEHOLDER));
    assert!(!xml.contains("<w:drawing"));
}

#[tokio::test]
async fn failed_diagram_leaves_placeholder_instead_of_picture() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "doc.md", TABLE_AND_DIAGRAM);
    let renderer = FailingRenderer::default();
    let report = convert_with_renderer(&input, Variant::Diagrams, &config_in(dir.path()), &renderer)
        .await
        .unwrap();
    assert_eq!(report.diagram_failures.len(), 1);

    let xml = read_document_xml(&report.output);
    let heading = styled_paragraph(&xml, "Heading1").expect("no Heading1 paragraph");
    assert!(heading.contains(">Title</w:t>"));
    assert_eq!(table_xml(&xml).matches("<w:gridCol").count(), 2);
    assert!(xml.contains(DIAGRAM_PLACEHOLDER));
    assert!(!xml.contains("<w:drawing"));
}

#[tokio::test]
async fn rendered_diagram_is_embedded_as_drawing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "doc.md", TABLE_AND_DIAGRAM);
    let renderer = StubRenderer::default();
    let report = convert_with_renderer(&input, Variant::Diagrams, &config_in(dir.path()), &renderer)
        .await
        .unwrap();
    assert_eq!(report.diagrams_rendered, 1);

    let xml = read_document_xml(&report.output);
    assert!(xml.contains("<w:drawing"));
    assert!(!xml.contains(DIAGRAM_PLACEHOLDER));
}

// ── LaTeX content ────────────────────────────────────────────────────────────

#[tokio::test]
async fn heading_and_table_reach_latex() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "doc.md",
        "# Title\n\n| A | B |\n| - | - |\n| 1 | 2 |\n",
    );
    let report = convert(&input, Variant::Latex, &config_in(dir.path()))
        .await
        .unwrap();
    assert_eq!(report.blocks.headings, 1);
    assert_eq!(report.blocks.tables, 1);

    let tex = read_tex(&dir);
    assert!(tex.contains("\\section{Title}"));
    assert!(tex.contains("\\begin{longtable}{|c|c|}"));
    assert!(tex.contains("A & B \\\\"));
    assert!(tex.contains("1 & 2 \\\\"));
    assert!(!tex.contains("- & -"), "separator row must be dropped");
}

#[tokio::test]
async fn latex_title_defaults_to_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "flight_plan.md", "text\n");
    convert(&input, Variant::Latex, &config_in(dir.path()))
        .await
        .unwrap();
    assert!(read_tex(&dir).contains("\\title{flight\\_plan}"));
}

#[tokio::test]
async fn configured_title_wins() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "x.md", "text\n");
    let config = ConversionConfig::builder()
        .output_dir(dir.path())
        .title("Ground station")
        .build()
        .unwrap();
    convert(&input, Variant::Latex, &config).await.unwrap();
    assert!(read_tex(&dir).contains("\\title{Ground station}"));
}

#[tokio::test]
async fn latex_diagram_is_boxed_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "d.md", "```mermaid\ngraph TD\n```\n");
    convert(&input, Variant::Latex, &config_in(dir.path()))
        .await
        .unwrap();
    let tex = read_tex(&dir);
    assert!(tex.contains("\\fbox{"));
    assert!(!tex.contains("graph TD"));
}

#[tokio::test]
async fn unterminated_fence_runs_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "u.md", "intro\n```\nline 1\n# not a heading\n");
    let report = convert(&input, Variant::Latex, &config_in(dir.path()))
        .await
        .unwrap();
    assert_eq!(report.blocks.code_blocks, 1);
    assert_eq!(report.blocks.headings, 0);
    assert!(read_tex(&dir).contains("\\begin{verbatim}\nline 1\n# not a heading\n\\end{verbatim}"));
}

#[tokio::test]
async fn existing_output_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("document.tex"), "stale").unwrap();
    let input = write_source(dir.path(), "a.md", "fresh text\n");
    convert(&input, Variant::Latex, &config_in(dir.path()))
        .await
        .unwrap();
    let tex = read_tex(&dir);
    assert!(tex.contains("fresh text"));
    assert!(!tex.contains("stale"));
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_source_fails_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    for variant in [Variant::Docx, Variant::Latex] {
        let err = convert(dir.path().join("absent.md"), variant, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Md2DocError::FileNotFound { .. }), "got {err:?}");
        assert!(!dir.path().join(variant.output_file_name()).exists());
    }
}

#[tokio::test]
async fn unwritable_output_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "a.md", "text\n");
    let blocker = write_source(dir.path(), "not_a_dir", "");
    let config = config_in(&blocker);

    let err = convert(&input, Variant::Latex, &config).await.unwrap_err();
    assert!(matches!(err, Md2DocError::OutputWriteFailed { .. }), "got {err:?}");
}

// ── Progress + sync wrapper ──────────────────────────────────────────────────

#[tokio::test]
async fn progress_events_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "p.md",
        "```mermaid\nA\n```\n```mermaid\nB\n```\n",
    );
    let cb = Arc::new(RecordingCallback::default());
    let config = ConversionConfig::builder()
        .output_dir(dir.path())
        .progress_callback(cb.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    convert_with_renderer(&input, Variant::Diagrams, &config, &StubRenderer::default())
        .await
        .unwrap();

    let events = cb.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start diagrams",
            "diagram 1",
            "done 1 40x20",
            "diagram 2",
            "done 2 40x20",
            "complete document_diagrams.docx",
        ]
    );
}

#[test]
fn convert_sync_runs_without_a_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "s.md", "alpha\nbeta\n");
    let report = convert_sync(&input, Variant::Docx, &config_in(dir.path())).unwrap();
    assert_eq!(report.blocks.paragraphs, 2);
    assert!(dir.path().join("document.docx").exists());
}
