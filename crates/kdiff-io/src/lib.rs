//! `kdiff-io` is the single supported public entrypoint for the kdiff rule
//! engine: reading and writing document corpora, loading rule files, and
//! re-exporting the engine, validator and defaults annotator.
//!
//! Layering:
//! - `kdiff-core`: document tree, pointers, YAML codec, merge patches
//! - `kdiff-rules`: rule model, desugaring, engine, effectiveness validation
//! - `kdiff-defaults`: defaults extraction and annotation
//! - this crate: filesystem boundaries and the public surface

// -----------------------------------------------------------------------------
// Public API contract
// -----------------------------------------------------------------------------
//
// Consumers SHOULD import from `kdiff_io::prelude::*`.
// Anything not re-exported via the prelude is considered internal and may change
// without notice.

/// Stable JSON rendering for reports.
pub mod canonical_json;

mod error;

/// Rule file loading.
pub mod rules;

/// Document corpus input and output.
pub mod state;

pub use error::IoError;

#[doc(hidden)]
pub mod core {
    pub use kdiff_core::model::{Document, ResourceKey};
    pub use kdiff_core::{merge_patch, pointer, yaml, Value};
}

#[doc(hidden)]
pub mod engine {
    pub use kdiff_rules::debug::{TodoChange, TodoRule};
    pub use kdiff_rules::{
        apply_rule_set, ApplyError, DebugError, DebugInfo, EffectivenessError,
        EffectivenessFinding, IgnoreRule, IneffectiveMatchError, IneffectivePatchError,
        Operation, PatchRule, RuleDescription, RuleError, RuleKind, RuleSet, TodoReport,
    };
}

#[doc(hidden)]
pub mod defaults {
    pub use kdiff_defaults::{
        annotate, annotate_documents, CommandDefaults, DefaultsError, DefaultsSource,
        FileDefaults,
    };
}

/// Convenience prelude for consumers.
///
/// This is the **only supported** import surface for external users.
pub mod prelude {
    pub use crate::core::{Document, ResourceKey, Value};
    pub use crate::defaults::*;
    pub use crate::engine::*;
    pub use crate::rules::{load_rule_set, read_rule_file};
    pub use crate::state::{read_state_from_path, write_state_to_directory, ReadState};
    pub use crate::{canonical_json, IoError};
}
