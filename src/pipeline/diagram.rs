//! Diagram rendering: diagram source → PNG in a temporary file.
//!
//! The default [`MermaidInkRenderer`] asks a mermaid.ink-compatible service
//! to rasterise the diagram: the source is base64-encoded into the URL path
//! (`GET {base}{payload}`) and the image bytes come back in the body. The
//! service is unauthenticated and may be slow or down, so every failure is
//! reported as a [`RenderError`] and the caller substitutes a placeholder.
//!
//! ## Why re-encode?
//!
//! The service may answer with JPEG or PNG depending on its defaults. The
//! body is decoded and stored as PNG, which both validates it and gives the
//! pixel dimensions needed to size the picture in the document.

use crate::config::ConversionConfig;
use crate::document::Picture;
use crate::error::{Md2DocError, RenderError};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::TempPath;
use tracing::debug;

/// A rendered diagram stored in a temporary PNG file.
///
/// The file is deleted when this value is dropped or [`close`](Self::close)d.
#[derive(Debug)]
pub struct RenderedDiagram {
    path: TempPath,
    width_px: u32,
    height_px: u32,
}

impl RenderedDiagram {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    /// Document element referring to this image.
    pub fn picture(&self) -> Picture {
        Picture {
            path: self.path.to_path_buf(),
            width_px: self.width_px,
            height_px: self.height_px,
        }
    }

    /// Delete the temporary file, reporting any error.
    pub fn close(self) -> std::io::Result<()> {
        self.path.close()
    }
}

/// Turns a diagram description into a raster image.
#[allow(async_fn_in_trait)]
pub trait DiagramRenderer {
    async fn render(&self, description: &str) -> Result<RenderedDiagram, RenderError>;
}

/// Renderer backed by a mermaid.ink-style HTTP endpoint.
#[derive(Debug, Clone)]
pub struct MermaidInkRenderer {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl MermaidInkRenderer {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, Md2DocError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Md2DocError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout_secs,
        })
    }

    pub fn from_config(config: &ConversionConfig) -> Result<Self, Md2DocError> {
        Self::new(config.renderer_url.clone(), config.render_timeout_secs)
    }

    /// Full request URL for `description`.
    pub fn request_url(&self, description: &str) -> String {
        format!("{}{}", self.base_url, encode_description(description))
    }

    fn request_error(&self, e: reqwest::Error) -> RenderError {
        if e.is_timeout() {
            RenderError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            RenderError::Request {
                detail: e.to_string(),
            }
        }
    }
}

impl DiagramRenderer for MermaidInkRenderer {
    async fn render(&self, description: &str) -> Result<RenderedDiagram, RenderError> {
        let url = self.request_url(description);
        debug!("Requesting diagram render: {} bytes of source", description.len());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RenderError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.request_error(e))?;
        debug!("Diagram renderer returned {} bytes", bytes.len());

        store_image(&bytes)
    }
}

/// URL-safe base64 of the trimmed diagram source.
///
/// Deliberately not standard base64 of the raw block: the standard alphabet
/// can emit `/`, which would split the URL path, and surrounding blank lines
/// would change the payload without changing the diagram.
pub fn encode_description(description: &str) -> String {
    URL_SAFE.encode(description.trim().as_bytes())
}

/// Decode `bytes` as an image and store it as a temporary PNG.
pub fn store_image(bytes: &[u8]) -> Result<RenderedDiagram, RenderError> {
    let img = image::load_from_memory(bytes).map_err(|e| RenderError::InvalidImage {
        detail: e.to_string(),
    })?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| RenderError::InvalidImage {
            detail: e.to_string(),
        })?;

    let mut file = tempfile::Builder::new()
        .prefix("md2doc-diagram-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| RenderError::TempFile {
            detail: e.to_string(),
        })?;
    file.write_all(&png).map_err(|e| RenderError::TempFile {
        detail: e.to_string(),
    })?;

    let path = file.into_temp_path();
    debug!(
        "Stored {}x{} diagram at {}",
        img.width(),
        img.height(),
        path.display()
    );

    Ok(RenderedDiagram {
        path,
        width_px: img.width(),
        height_px: img.height(),
    })
}
