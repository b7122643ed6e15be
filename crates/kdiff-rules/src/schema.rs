use std::fmt;

use indexmap::IndexMap;
use kdiff_core::pointer::Pointer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Test,
    Add,
    Remove,
    Replace,
    Move,
}

impl OpKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            OpKind::Test => "test",
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
            OpKind::Move => "move",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single JSON Patch style operation.
///
/// Field naming follows RFC 6902: `op`, `path`, `value`, `from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Operation {
    pub op: OpKind,

    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Source pointer, only meaningful for `move`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Operation {
    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(OpKind::Test, path, value)
    }

    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(OpKind::Add, path, value)
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(OpKind::Replace, path, value)
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: OpKind::Remove,
            path: path.into(),
            value: None,
            from: None,
        }
    }

    pub fn move_field(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: OpKind::Move,
            path: path.into(),
            value: None,
            from: Some(from.into()),
        }
    }

    fn with_value(op: OpKind, path: impl Into<String>, value: Value) -> Self {
        Self {
            op,
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    /// The operand, treating an absent `value` as null.
    pub fn value_or_null(&self) -> &Value {
        self.value.as_ref().unwrap_or(&NULL)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            OpKind::Test => write!(f, "test {} == {}", self.path, self.value_or_null()),
            OpKind::Add | OpKind::Replace => {
                write!(f, "{} {} = {}", self.op, self.path, self.value_or_null())
            }
            OpKind::Remove => write!(f, "remove {}", self.path),
            OpKind::Move => write!(
                f,
                "move {} -> {}",
                self.from.as_deref().unwrap_or("<missing from>"),
                self.path
            ),
        }
    }
}

/// One entry of a rule's `match` list.
///
/// In canonical form `op` is set and `matchers` is empty. Before desugaring a
/// step may carry only `matchers`, each mapping a pointer to the values the
/// rule should be specialized for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<OpKind>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Declaration order is expansion order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub matchers: IndexMap<String, Vec<Value>>,
}

impl MatchStep {
    pub fn matcher(path: impl Into<String>, values: Vec<Value>) -> Self {
        let mut matchers = IndexMap::new();
        matchers.insert(path.into(), values);
        Self {
            matchers,
            ..Self::default()
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        self.op.map(|op| Operation {
            op,
            path: self.path.clone(),
            value: self.value.clone(),
            from: self.from.clone(),
        })
    }
}

impl From<Operation> for MatchStep {
    fn from(op: Operation) -> Self {
        Self {
            op: Some(op.op),
            path: op.path,
            value: op.value,
            from: op.from,
            matchers: IndexMap::new(),
        }
    }
}

/// `{from, to}` pair used by the rename shorthands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Drops every matching document from the output corpus.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreRule {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub match_steps: Vec<MatchStep>,
}

/// Mutates every matching document.
///
/// Either the canonical `match`/`steps` form or exactly one shorthand
/// (`renameObject`, `removeField`, `renameField`) is authored; desugaring
/// folds the shorthand into `match`/`steps` and clears it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatchRule {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Marks a rule whose changes should be listed by `--print-todo`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub todo: bool,

    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub match_steps: Vec<MatchStep>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_object: Option<Rename>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_field: Option<Rename>,
}

impl PatchRule {
    pub fn has_shorthand(&self) -> bool {
        self.rename_object.is_some() || self.remove_field.is_some() || self.rename_field.is_some()
    }
}

/// Ignore rules run before patch rules; both in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleSet {
    #[serde(default)]
    pub ignore_rules: Vec<IgnoreRule>,

    #[serde(default)]
    pub patch_rules: Vec<PatchRule>,
}

impl RuleSet {
    /// Append `other`'s rules after this set's rules, per list.
    pub fn merge(&mut self, other: RuleSet) {
        self.ignore_rules.extend(other.ignore_rules);
        self.patch_rules.extend(other.patch_rules);
    }

    pub fn len(&self) -> usize {
        self.ignore_rules.len() + self.patch_rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Canonical view of every rule, ignore rules first.
    pub fn describe(&self) -> Result<Vec<RuleDescription>, RuleError> {
        let ignore = self.ignore_rules.iter().map(IgnoreRule::describe);
        let patch = self.patch_rules.iter().map(PatchRule::describe);
        ignore.chain(patch).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Ignore,
    Patch,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleKind::Ignore => "ignore",
            RuleKind::Patch => "patch",
        })
    }
}

/// A rule in canonical form: plain match operations and patch operations.
///
/// This is what the engine evaluates and what the debug recorder binds to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDescription {
    pub kind: RuleKind,
    pub name: String,
    pub todo: bool,
    pub match_rules: Vec<Operation>,
    pub patch_rules: Vec<Operation>,
}

impl IgnoreRule {
    pub fn describe(&self) -> Result<RuleDescription, RuleError> {
        Ok(RuleDescription {
            kind: RuleKind::Ignore,
            name: self.name.clone(),
            todo: false,
            match_rules: canonical_match(&self.name, &self.match_steps)?,
            patch_rules: Vec::new(),
        })
    }
}

impl PatchRule {
    pub fn describe(&self) -> Result<RuleDescription, RuleError> {
        if self.has_shorthand() {
            return Err(RuleError::NotDesugared {
                rule: display_name(&self.name),
            });
        }
        for (step, op) in self.steps.iter().enumerate() {
            check_operation(&self.name, step, op)?;
        }
        Ok(RuleDescription {
            kind: RuleKind::Patch,
            name: self.name.clone(),
            todo: self.todo,
            match_rules: canonical_match(&self.name, &self.match_steps)?,
            patch_rules: self.steps.clone(),
        })
    }
}

fn canonical_match(name: &str, steps: &[MatchStep]) -> Result<Vec<Operation>, RuleError> {
    steps
        .iter()
        .enumerate()
        .map(|(step, m)| {
            if !m.matchers.is_empty() {
                return Err(RuleError::NotDesugared {
                    rule: display_name(name),
                });
            }
            let op = m.operation().ok_or_else(|| RuleError::MissingOp {
                rule: display_name(name),
                step,
            })?;
            check_operation(name, step, &op)?;
            Ok(op)
        })
        .collect()
}

/// Reject operations that could never apply, whatever the document.
fn check_operation(name: &str, step: usize, op: &Operation) -> Result<(), RuleError> {
    let invalid = |reason: String| RuleError::InvalidStep {
        rule: display_name(name),
        step,
        reason,
    };

    Pointer::parse(&op.path).map_err(|e| invalid(e.to_string()))?;
    match op.op {
        OpKind::Add | OpKind::Replace if op.value.is_none() => {
            Err(invalid(format!("{} requires a value", op.op)))
        }
        OpKind::Move => {
            let from = op
                .from
                .as_deref()
                .ok_or_else(|| invalid("move requires 'from'".to_string()))?;
            Pointer::parse(from).map_err(|e| invalid(e.to_string()))?;
            Ok(())
        }
        _ => Ok(()),
    }
}

pub(crate) fn display_name(name: &str) -> String {
    if name.is_empty() {
        "<unnamed>".to_string()
    } else {
        name.to_string()
    }
}

/// Errors in how a rule is authored. All are fatal configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("rule '{rule}' sets more than one shorthand ({fields}); split it into separate rules")]
    AmbiguousShorthand { rule: String, fields: String },

    #[error("rule '{rule}' combines {field} with match/steps; use one form or the other")]
    ShorthandWithSteps { rule: String, field: String },

    #[error("rule '{rule}' matcher for '{path}' lists no values")]
    EmptyMatcher { rule: String, path: String },

    #[error("rule '{rule}' match step {step} has neither an op nor matchers")]
    MissingOp { rule: String, step: usize },

    #[error("rule '{rule}' is not desugared (shorthand or matchers still present)")]
    NotDesugared { rule: String },

    #[error("rule '{rule}' step {step} is invalid: {reason}")]
    InvalidStep {
        rule: String,
        step: usize,
        reason: String,
    },
}
