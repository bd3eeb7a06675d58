//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while a document is converted. Only the `diagrams` variant emits
//! per-diagram events, since it is the only one that waits on the network.
//!
//! # Example
//!
//! ```rust
//! use md2doc::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_diagram_complete(&self, index: usize, width_px: u32, height_px: u32) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("diagram {index}: {width_px}x{height_px}");
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { rendered: AtomicUsize::new(0) });
//! let config = ConversionConfig::builder()
//!     .progress_callback(cb as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Variant;
use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it works through a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the source has been read, before parsing starts.
    fn on_conversion_start(&self, input: &Path, variant: Variant) {
        let _ = (input, variant);
    }

    /// Called just before a diagram is sent to the renderer.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position of the diagram in the document
    fn on_diagram_start(&self, index: usize) {
        let _ = index;
    }

    /// Called when a diagram was rendered to an image.
    fn on_diagram_complete(&self, index: usize, width_px: u32, height_px: u32) {
        let _ = (index, width_px, height_px);
    }

    /// Called when a diagram could not be rendered and a placeholder is used.
    fn on_diagram_error(&self, index: usize, error: &str) {
        let _ = (index, error);
    }

    /// Called after the output file has been written.
    fn on_conversion_complete(&self, output: &Path) {
        let _ = output;
    }
}

/// Shared, thread-safe progress callback handle.
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// A no-op implementation, handy as a default.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}
