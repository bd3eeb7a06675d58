//! Configuration types for Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The output *format* is not part of the
//! config: it is chosen per call with a [`Variant`], and each variant writes to
//! its own fixed file name.

use crate::error::Md2DocError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Source file read when no input path is given.
pub const DEFAULT_INPUT: &str = "document.md";

/// Default diagram renderer endpoint. The base64 payload is appended.
pub const DEFAULT_RENDERER_URL: &str = "https://mermaid.ink/img/";

/// Configuration for a Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2doc::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .title("Flight controller notes")
///     .render_timeout_secs(20)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Document title placed at the top of the output. If None, the input
    /// file stem is used.
    pub title: Option<String>,

    /// Base URL of the diagram rendering service. Default: [`DEFAULT_RENDERER_URL`].
    ///
    /// The request URL is this string with the URL-safe base64 encoding of the
    /// diagram source appended, so it normally ends with `/`.
    pub renderer_url: String,

    /// Per-diagram HTTP timeout in seconds. Default: 60.
    pub render_timeout_secs: u64,

    /// Width of rendered diagrams in the Word document, in inches. Default: 6.0.
    ///
    /// Height follows the image's aspect ratio.
    pub image_width_inches: f32,

    /// Fence languages treated as diagram descriptions (case-insensitive).
    /// Default: `["mermaid"]`.
    pub diagram_languages: Vec<String>,

    /// Directory the fixed-name output file is written to. Default: `.`.
    pub output_dir: PathBuf,

    /// Optional per-diagram progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            title: None,
            renderer_url: DEFAULT_RENDERER_URL.to_string(),
            render_timeout_secs: 60,
            image_width_inches: 6.0,
            diagram_languages: vec!["mermaid".to_string()],
            output_dir: PathBuf::from("."),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("title", &self.title)
            .field("renderer_url", &self.renderer_url)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("image_width_inches", &self.image_width_inches)
            .field("diagram_languages", &self.diagram_languages)
            .field("output_dir", &self.output_dir)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn renderer_url(mut self, url: impl Into<String>) -> Self {
        self.config.renderer_url = url.into();
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn image_width_inches(mut self, inches: f32) -> Self {
        self.config.image_width_inches = inches;
        self
    }

    pub fn diagram_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.diagram_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2DocError> {
        let c = &self.config;
        if !(c.renderer_url.starts_with("http://") || c.renderer_url.starts_with("https://")) {
            return Err(Md2DocError::InvalidConfig(format!(
                "renderer URL must be http:// or https://, got '{}'",
                c.renderer_url
            )));
        }
        if c.render_timeout_secs == 0 {
            return Err(Md2DocError::InvalidConfig(
                "render timeout must be ≥ 1 second".into(),
            ));
        }
        if !(c.image_width_inches > 0.0 && c.image_width_inches <= 22.0) {
            return Err(Md2DocError::InvalidConfig(format!(
                "image width must be in (0, 22] inches, got {}",
                c.image_width_inches
            )));
        }
        if c.diagram_languages.iter().any(|l| l.trim().is_empty()) {
            return Err(Md2DocError::InvalidConfig(
                "diagram languages must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which converter to run. Each variant owns a fixed output file name.
///
/// | Variant | Output | Diagrams | Tables |
/// |---------|--------|----------|--------|
/// | `Docx` | `document.docx` | source text | flattened to text |
/// | `Diagrams` | `document_diagrams.docx` | rendered image | Word table |
/// | `Tables` | `document_tables.docx` | placeholder | Word table + spacing |
/// | `Latex` | `document.tex` | boxed placeholder | `longtable` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Plain Word document: every block becomes a paragraph.
    Docx,
    /// Word document with diagram blocks rendered to images.
    Diagrams,
    /// Word document focused on faithful tables; diagrams become placeholders.
    Tables,
    /// LaTeX source.
    Latex,
}

impl Variant {
    /// Fixed output file name for this variant.
    pub fn output_file_name(self) -> &'static str {
        match self {
            Variant::Docx => "document.docx",
            Variant::Diagrams => "document_diagrams.docx",
            Variant::Tables => "document_tables.docx",
            Variant::Latex => "document.tex",
        }
    }

    /// Whether diagram blocks are sent to the renderer.
    pub fn renders_diagrams(self) -> bool {
        matches!(self, Variant::Diagrams)
    }

    /// Whether the output is a Word package.
    pub fn is_word(self) -> bool {
        !matches!(self, Variant::Latex)
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Docx => "docx",
            Variant::Diagrams => "diagrams",
            Variant::Tables => "tables",
            Variant::Latex => "latex",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
