//! Output stage: serialise the [`Document`] for a variant and write it.
//!
//! Writes go to `<name>.tmp` first and are renamed into place, so a failed
//! run never leaves a truncated document behind.

use crate::config::Variant;
use crate::document::Document;
use crate::error::Md2DocError;
use crate::pipeline::{docx, latex};
use std::path::Path;
use tracing::debug;

/// Serialise `doc` in the format `variant` calls for.
pub fn serialize(
    doc: &Document,
    variant: Variant,
    image_width_inches: f32,
    output: &Path,
) -> Result<Vec<u8>, Md2DocError> {
    if variant.is_word() {
        docx::build_docx(doc, image_width_inches, output)
    } else {
        Ok(latex::render_latex(doc).into_bytes())
    }
}

/// Atomic write: temp file next to `path`, then rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Md2DocError> {
    let io_err = |source: std::io::Error| Md2DocError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let ext = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    let tmp_path = path.with_extension(ext);

    tokio::fs::write(&tmp_path, bytes).await.map_err(io_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(io_err(e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
