//! ⚠️ INTERNAL CRATE – NOT A STABLE API
//!
//! Rule model, desugaring, the match/patch engine and the effectiveness
//! validator. Use `kdiff-io` instead.

pub mod apply;
pub mod debug;
pub mod desugar;
pub mod diagnostics;
pub mod operation;
pub mod schema;
pub mod validate;

pub use apply::{apply_rule_set, ApplyError};
pub use debug::{DebugError, DebugInfo, NoopRecorder, Recorder, RuleDebugInfo, TodoReport};
pub use desugar::{desugar, desugar_ignore};
pub use diagnostics::{
    EffectivenessError, EffectivenessFinding, IneffectiveMatchError, IneffectivePatchError,
};
pub use operation::OperationError;
pub use schema::{
    IgnoreRule, MatchStep, OpKind, Operation, PatchRule, Rename, RuleDescription, RuleError,
    RuleKind, RuleSet,
};
