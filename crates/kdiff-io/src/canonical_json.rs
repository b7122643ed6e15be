//! Stable JSON rendering for machine-readable reports.
//!
//! Output is minified with object keys sorted lexicographically at every
//! depth, struct fields included, so two runs over the same findings print
//! identical bytes.
//!
//! Notes:
//! - sorting relies on `serde_json::Value` keeping its default ordered map;
//!   nothing in the workspace enables `preserve_order`

use serde::Serialize;

/// Render a serializable value as canonical JSON.
pub fn to_canonical_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serde_json::to_value(value)?)
}
