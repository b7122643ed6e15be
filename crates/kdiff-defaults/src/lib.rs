//! ⚠️ INTERNAL CRATE – NOT A STABLE API
//!
//! Defaults extraction and annotation. Use `kdiff-io` instead.

pub mod annotate;
pub mod source;

pub use annotate::{annotate, annotate_documents, DEFAULT_MARKER};
pub use source::{CommandDefaults, DefaultsError, DefaultsSource, FileDefaults};
