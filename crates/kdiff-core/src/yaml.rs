//! YAML codec for document trees.
//!
//! Decoding goes through `serde_yaml::Value` so that YAML-only features
//! (non-string keys, tags) are normalized explicitly instead of failing deep
//! inside serde.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported mapping key {0}: only string, number and boolean keys are allowed")]
    UnsupportedKey(String),
    #[error("number {0} cannot be represented (non-finite)")]
    NonFiniteNumber(f64),
}

/// Decode every document of a (possibly multi-document) YAML stream.
///
/// Empty documents, e.g. produced by a trailing `---`, are skipped.
pub fn decode_stream(text: &str) -> Result<Vec<Value>, DocumentError> {
    let mut out = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let raw = serde_yaml::Value::deserialize(document)?;
        if raw.is_null() {
            continue;
        }
        out.push(from_yaml(raw)?);
    }
    Ok(out)
}

/// Decode a single YAML document.
pub fn decode(text: &str) -> Result<Value, DocumentError> {
    let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
    from_yaml(raw)
}

pub fn from_yaml(raw: serde_yaml::Value) -> Result<Value, DocumentError> {
    Ok(match raw {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => Value::Number(number(&n)?),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (k, v) in mapping {
                map.insert(mapping_key(k)?, from_yaml(v)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn number(n: &serde_yaml::Number) -> Result<Number, DocumentError> {
    if let Some(i) = n.as_i64() {
        return Ok(Number::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Number::from(u));
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    Number::from_f64(f).ok_or(DocumentError::NonFiniteNumber(f))
}

fn mapping_key(key: serde_yaml::Value) -> Result<String, DocumentError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => mapping_key(tagged.value),
        other => Err(DocumentError::UnsupportedKey(format!("{other:?}"))),
    }
}

/// Encode a single document as YAML.
pub fn encode(value: &Value) -> Result<String, DocumentError> {
    Ok(serde_yaml::to_string(value)?)
}

/// Encode documents as one YAML stream separated by `---`.
pub fn encode_stream<'a>(values: impl IntoIterator<Item = &'a Value>) -> Result<String, DocumentError> {
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        out.push_str(&encode(value)?);
    }
    Ok(out)
}
