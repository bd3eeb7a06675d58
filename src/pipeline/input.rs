//! Source reading: Markdown file on disk → UTF-8 text.
//!
//! I/O failures are mapped onto the fatal [`Md2DocError`] variants up front
//! so the CLI can print a specific hint instead of a bare `io::Error`.

use crate::config::DEFAULT_INPUT;
use crate::error::Md2DocError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The path to read: the given one, or `document.md` in the working directory.
pub fn resolve_input(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT))
}

/// Title derived from the file name (`notes/plan.md` → `plan`).
pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Document".to_string())
}

/// Read the whole source file, dropping a leading byte-order mark.
pub async fn read_source(path: &Path) -> Result<String, Md2DocError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => Md2DocError::FileNotFound {
                path: path.to_path_buf(),
            },
            ErrorKind::PermissionDenied => Md2DocError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Md2DocError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
