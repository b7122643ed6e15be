use kdiff_core::model::Document;
use serde_json::Value;
use tracing::debug;

/// Suffix appended to a value that equals its default.
pub const DEFAULT_MARKER: &str = " (default)";

/// Co-walk `actual` and `defaults`, replacing every scalar leaf of `actual`
/// that equals the default at the same position with `"<value> (default)"`.
///
/// Rules:
/// - mapping vs mapping: recurse per key of `actual`; a key absent from
///   `defaults` has no default
/// - sequence vs sequence: recurse per index while the index exists in
///   `defaults`; later items are left as is
/// - a shape mismatch leaves the subtree as is
/// - nulls are never annotated
///
/// `defaults` is only read.
pub fn annotate(defaults: &Value, actual: Value) -> Value {
    match (defaults, actual) {
        (Value::Object(defaults), Value::Object(map)) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = match defaults.get(&key) {
                        Some(default) => annotate(default, value),
                        None => value,
                    };
                    (key, value)
                })
                .collect(),
        ),
        (Value::Array(defaults), Value::Array(items)) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, value)| match defaults.get(i) {
                    Some(default) => annotate(default, value),
                    None => value,
                })
                .collect(),
        ),
        (_, actual @ (Value::Object(_) | Value::Array(_) | Value::Null)) => actual,
        (default, actual) if *default == actual => {
            Value::String(format!("{actual}{DEFAULT_MARKER}"))
        }
        (_, actual) => actual,
    }
}

/// Annotate every document against `defaults`, then drop null-valued keys.
pub fn annotate_documents(defaults: &Document, documents: Vec<Document>) -> Vec<Document> {
    documents
        .into_iter()
        .map(|doc| {
            let Document { source, object } = doc;
            debug!(source = %source, "annotating defaults");
            let mut annotated = Document::new(source, annotate(&defaults.object, object));
            annotated.remove_nulls();
            annotated
        })
        .collect()
}
