#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the kdiff project.

Do NOT depend on this crate directly.
Use `kdiff-io` instead.
"#]

pub mod merge_patch;
pub mod model;
pub mod pointer;
pub mod yaml;

/// The tree value every document is made of.
///
/// `serde_json::Value` with the default map representation keeps object keys
/// sorted, so equality, encoding and diffs never depend on insertion order.
pub use serde_json::Value;
