use std::path::PathBuf;

use kdiff_core::model::ResourceKey;
use kdiff_core::yaml::DocumentError;
use kdiff_rules::RuleError;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode documents for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("invalid output template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("output file name {name:?} for {resource} is not a plain file name")]
    FileName { name: String, resource: ResourceKey },

    #[error("rule file {path} does not conform to the rule schema:\n{}", .errors.join("\n"))]
    RuleSchema { path: PathBuf, errors: Vec<String> },

    #[error("rule file {path} is invalid: {source}")]
    RuleParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule schema is unusable: {0}")]
    SchemaUnavailable(String),

    #[error(transparent)]
    Rule(#[from] RuleError),
}
