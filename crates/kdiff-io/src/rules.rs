//! Loading rule files.

use std::path::Path;

use jsonschema::Validator;
use kdiff_core::yaml;
use kdiff_rules::RuleSet;
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::IoError;

/// JSON Schema every rule file must satisfy before it is deserialized.
pub const RULES_SCHEMA_JSON: &str = include_str!("../schema/rules.schema.json");

static RULES_SCHEMA: Lazy<Result<Validator, String>> = Lazy::new(|| {
    let schema_json: Value = serde_json::from_str(RULES_SCHEMA_JSON)
        .map_err(|e| format!("invalid rule schema JSON: {e}"))?;

    Validator::new(&schema_json).map_err(|e| format!("compile rule schema: {e}"))
});

fn rules_schema() -> Result<&'static Validator, IoError> {
    RULES_SCHEMA
        .as_ref()
        .map_err(|e| IoError::SchemaUnavailable(e.clone()))
}

/// Parse one rule file. The result is not desugared yet.
///
/// A file may hold several YAML documents; they are merged in order. An empty
/// file is an empty rule set.
pub fn read_rule_file(path: &Path) -> Result<RuleSet, IoError> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let documents = yaml::decode_stream(&text).map_err(|source| IoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rules = RuleSet::default();
    for value in documents {
        rules.merge(parse_rule_document(path, value)?);
    }
    debug!(path = %path.display(), rules = rules.len(), "read rule file");
    Ok(rules)
}

fn parse_rule_document(path: &Path, value: Value) -> Result<RuleSet, IoError> {
    let errors: Vec<String> = rules_schema()?
        .iter_errors(&value)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(IoError::RuleSchema {
            path: path.to_path_buf(),
            errors,
        });
    }

    serde_json::from_value(value).map_err(|source| IoError::RuleParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read, merge (in argument order) and desugar rule files.
pub fn load_rule_set<P: AsRef<Path>>(paths: &[P]) -> Result<RuleSet, IoError> {
    let mut merged = RuleSet::default();
    for path in paths {
        merged.merge(read_rule_file(path.as_ref())?);
    }

    let declared = merged.len();
    let rules = merged.desugar()?;
    info!(files = paths.len(), declared, expanded = rules.len(), "loaded rules");
    Ok(rules)
}
