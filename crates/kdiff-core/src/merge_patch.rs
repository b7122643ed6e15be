//! JSON Merge Patch (RFC 7386) creation and application.
//!
//! Used to summarize what a patch step did to a document: an empty object
//! means the step changed nothing.

use serde_json::{Map, Value};

/// Compute the merge patch that turns `old` into `new`.
///
/// Keys removed in `new` map to `null`; arrays are replaced wholesale.
pub fn create(old: &Value, new: &Value) -> Value {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let mut patch = Map::new();

            for key in old_map.keys() {
                if !new_map.contains_key(key) {
                    patch.insert(key.clone(), Value::Null);
                }
            }

            for (key, new_value) in new_map {
                match old_map.get(key) {
                    Some(old_value) if old_value == new_value => {}
                    Some(old_value) if old_value.is_object() && new_value.is_object() => {
                        patch.insert(key.clone(), create(old_value, new_value));
                    }
                    _ => {
                        patch.insert(key.clone(), new_value.clone());
                    }
                }
            }

            Value::Object(patch)
        }
        _ if old == new => Value::Object(Map::new()),
        _ => new.clone(),
    }
}

/// True for the patch that changes nothing (`{}`).
pub fn is_empty(patch: &Value) -> bool {
    matches!(patch, Value::Object(map) if map.is_empty())
}
