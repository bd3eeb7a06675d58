//! Pipeline stages for Markdown-to-document conversion.
//!
//! Each submodule implements one transformation step and is tested on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ parse ──▶ (diagram) ──▶ map ──▶ write
//! (file)    (blocks)   (HTTP PNG)   (Document)  (docx / latex)
//! ```
//!
//! 1. [`input`]  : read the source file as UTF-8
//! 2. [`parse`]  : lazily split the text into blocks, in document order
//! 3. [`diagram`]: rasterise diagram blocks through an HTTP renderer; the
//!    only stage with network I/O, and only for the `diagrams` variant
//! 4. [`map`]    : append each block to the format-neutral
//!    [`crate::document::Document`], one element per block
//! 5. [`write`]  : serialise via [`docx`] or [`latex`] and write atomically
//!
//! [`inline`] holds the inline-markup stripping used by the Word variants.

pub mod diagram;
pub mod docx;
pub mod inline;
pub mod input;
pub mod latex;
pub mod map;
pub mod parse;
pub mod write;
