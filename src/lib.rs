//! # md2doc
//!
//! Convert Markdown documents to Word (`.docx`) or LaTeX.
//!
//! The converter understands a deliberately small subset of Markdown:
//! ATX headings, paragraphs, pipe tables, fenced code blocks and fenced
//! diagram descriptions (Mermaid by default). Everything else passes
//! through as paragraph text. Malformed input never aborts a run.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Input   read the whole source file
//!  ├─ 2. Parse   lazy iterator of typed blocks
//!  ├─ 3. Render  diagrams → PNG via an HTTP renderer (diagrams variant only)
//!  ├─ 4. Map     one append per block onto a format-neutral Document
//!  └─ 5. Write   docx-rs package or LaTeX source, written atomically
//! ```
//!
//! ## Variants
//!
//! | Variant | Output file | Notes |
//! |---------|-------------|-------|
//! | [`Variant::Docx`] | `document.docx` | every block is a plain paragraph |
//! | [`Variant::Diagrams`] | `document_diagrams.docx` | diagrams rendered to images |
//! | [`Variant::Tables`] | `document_tables.docx` | real tables, diagram placeholders |
//! | [`Variant::Latex`] | `document.tex` | XeLaTeX source |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2doc::{convert, ConversionConfig, Variant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert("document.md", Variant::Tables, &config).await?;
//!     println!("wrote {}", report.output.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2doc` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use buildfs_hook;
pub use config::{ConversionConfig, ConversionConfigBuilder, Variant};
pub use convert::{convert, convert_sync, convert_with_renderer};
pub use document::{Document, Element, Paragraph, Picture, TableGrid};
pub use error::{Md2DocError, RenderError};
pub use output::{BlockCounts, ConversionReport, DiagramFailure};
pub use pipeline::diagram::{DiagramRenderer, MermaidInkRenderer, RenderedDiagram};
pub use pipeline::parse::{parse, Block, TableBlock};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
