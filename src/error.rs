//! Error types for the md2doc library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Md2DocError`]: **Fatal**: the conversion cannot proceed at all
//!   (source file missing, output not writable, bad configuration). Returned
//!   as `Err(Md2DocError)` from the top-level `convert*` functions.
//!
//! * [`RenderError`]: **Non-fatal**: a single diagram could not be rendered
//!   (endpoint unreachable, non-200 status, undecodable image). The pipeline
//!   substitutes a placeholder and records the error in
//!   [`crate::output::ConversionReport::diagram_failures`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the md2doc library.
#[derive(Debug, Error)]
pub enum Md2DocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source Markdown file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The Word package could not be assembled.
    #[error("Failed to build Word document '{path}': {detail}")]
    DocxBuildFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single diagram.
///
/// The diagram is replaced by a placeholder and the run continues.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum RenderError {
    /// The request could not be sent or the response body not read.
    #[error("request to diagram renderer failed: {detail}")]
    Request { detail: String },

    /// The renderer did not answer within the configured timeout.
    #[error("diagram renderer timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The renderer answered with something other than 200 OK.
    #[error("diagram renderer returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// The response body is not an image we can decode.
    #[error("diagram renderer returned an undecodable image: {detail}")]
    InvalidImage { detail: String },

    /// The rendered image could not be stored in a temporary file.
    #[error("could not store rendered diagram: {detail}")]
    TempFile { detail: String },
}
