use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::merge_patch;

/// A single manifest read from the corpus.
///
/// `source` is fixed for the lifetime of the document; everything else about
/// its identity is derived from the current content, so a rename performed by
/// a rule is visible in later reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Path of the file the document was read from.
    pub source: String,
    /// Root of the document tree (usually a mapping).
    pub object: Value,
}

impl Document {
    pub fn new(source: impl Into<String>, object: Value) -> Self {
        Self {
            source: source.into(),
            object,
        }
    }

    /// Identity of the document as of its current content.
    pub fn resource_key(&self) -> ResourceKey {
        ResourceKey::for_object(&self.source, &self.object)
    }

    /// Merge patch (RFC 7386) that turns `self` into `newer`.
    ///
    /// An unchanged document yields the empty object `{}`.
    pub fn diff(&self, newer: &Document) -> Value {
        merge_patch::create(&self.object, &newer.object)
    }

    /// Recursively drop mapping entries whose value is null.
    pub fn remove_nulls(&mut self) {
        remove_nulls(&mut self.object);
    }
}

fn remove_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for v in map.values_mut() {
                remove_nulls(v);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                remove_nulls(v);
            }
        }
        _ => {}
    }
}

/// Source locator plus the optional `(kind, namespace, name)` logical key.
///
/// Ordering is total (source first) so reports grouped by key are stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceKey {
    /// Derive a key from the well-known `kind`, `metadata.namespace` and
    /// `metadata.name` fields. Non-string values are ignored.
    pub fn for_object(source: &str, object: &Value) -> Self {
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
        let metadata = object.get("metadata");

        Self {
            source: source.to_string(),
            kind: text(object.get("kind")),
            namespace: text(metadata.and_then(|m| m.get("namespace"))),
            name: text(metadata.and_then(|m| m.get("name"))),
        }
    }

    pub fn has_logical_key(&self) -> bool {
        self.kind.is_some() || self.namespace.is_some() || self.name.is_some()
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_logical_key() {
            return f.write_str(&self.source);
        }
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{}: {}/{}/{}",
            self.source,
            part(&self.kind),
            part(&self.namespace),
            part(&self.name)
        )
    }
}
