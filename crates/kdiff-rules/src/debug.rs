//! Per-rule, per-step record of what the engine did.
//!
//! Notes:
//! - One [`DebugInfo`] spans a whole run, across every input directory, and
//!   is consumed once by the effectiveness validator.
//! - Recorded documents are snapshots; later rules never alter them.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use indexmap::IndexMap;
use kdiff_core::merge_patch;
use kdiff_core::model::{Document, ResourceKey};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{RuleDescription, RuleSet};

/// Capability the engine reports match/patch/ignore events to.
pub trait Recorder {
    fn record_match(&mut self, step: usize, doc: &Document);
    fn record_patch(&mut self, step: usize, old: &Document, new: &Document);
    fn record_ignore(&mut self, doc: &Document);
}

/// Recorder used when no debug information is requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl Recorder for NoopRecorder {
    fn record_match(&mut self, _step: usize, _doc: &Document) {}
    fn record_patch(&mut self, _step: usize, _old: &Document, _new: &Document) {}
    fn record_ignore(&mut self, _doc: &Document) {}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebugError {
    /// The caller paired a slot with the wrong rule. This is a bug in the
    /// caller, not a user error.
    #[error("debug slot {index} is bound to rule '{bound}' but was requested for rule '{requested}'")]
    RuleMismatch {
        index: usize,
        bound: String,
        requested: String,
    },
    #[error("debug slot {index} does not exist ({len} slots)")]
    SlotOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    rules: Vec<Option<RuleDebugInfo>>,
    initial_objects: Vec<Document>,
}

impl DebugInfo {
    /// One slot per rule of `rule_set`, ignore rules first.
    pub fn new(rule_set: &RuleSet) -> Self {
        Self {
            rules: (0..rule_set.len()).map(|_| None).collect(),
            initial_objects: Vec::new(),
        }
    }

    /// Snapshot the documents of one input directory before any rule runs.
    pub fn add_initial_objects(&mut self, documents: &[Document]) {
        self.initial_objects.extend_from_slice(documents);
    }

    pub fn initial_objects(&self) -> &[Document] {
        &self.initial_objects
    }

    /// The record bound to slot `index`, created on first use.
    ///
    /// Requesting an existing slot for a rule with a different name fails
    /// with [`DebugError::RuleMismatch`].
    pub fn rule_debug_info(
        &mut self,
        index: usize,
        rule: &RuleDescription,
    ) -> Result<&mut RuleDebugInfo, DebugError> {
        let len = self.rules.len();
        let slot = self
            .rules
            .get_mut(index)
            .ok_or(DebugError::SlotOutOfRange { index, len })?;
        let info = slot.get_or_insert_with(|| RuleDebugInfo::new(rule.clone()));

        if info.rule.name != rule.name {
            return Err(DebugError::RuleMismatch {
                index,
                bound: info.rule.name.clone(),
                requested: rule.name.clone(),
            });
        }
        Ok(info)
    }

    /// Records of every rule that ran, in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &RuleDebugInfo> {
        self.rules.iter().flatten()
    }

    /// Changes made by rules flagged `todo`, per resource.
    ///
    /// Each change set is accumulated from reversed merge patches (new to
    /// old), so it lists exactly the fields the rule touched with their
    /// original values; `null` marks a field the rule introduced. Rules that
    /// share a name (matcher expansions) are reported together.
    pub fn todo_report(&self) -> TodoReport {
        let mut by_rule: IndexMap<String, BTreeMap<ResourceKey, Value>> = IndexMap::new();

        for info in self.rules().filter(|info| info.rule.todo) {
            let changes = by_rule.entry(info.rule.name.clone()).or_default();
            for patch in info.patches.iter().flat_map(|p| &p.patched_objects) {
                let reversed = merge_patch::create(&patch.new.object, &patch.old.object);
                let acc = changes
                    .entry(patch.new.resource_key())
                    .or_insert_with(|| Value::Object(Map::new()));
                accumulate(acc, &reversed);
            }
        }

        let rules = by_rule
            .into_iter()
            .map(|(name, changes)| TodoRule {
                name,
                changes: changes
                    .into_iter()
                    .filter(|(_, patch)| !merge_patch::is_empty(patch))
                    .map(|(resource, patch)| TodoChange { resource, patch })
                    .collect(),
            })
            .collect();

        TodoReport { rules }
    }
}

/// Deep merge that keeps nulls, unlike merge-patch application.
fn accumulate(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match target_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        accumulate(existing, value)
                    }
                    _ => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Everything observed for one rule.
#[derive(Debug, Clone)]
pub struct RuleDebugInfo {
    pub rule: RuleDescription,
    pub matches: Vec<MatchDebugInfo>,
    pub patches: Vec<PatchDebugInfo>,
    pub ignored: Vec<Document>,
}

#[derive(Debug, Clone, Default)]
pub struct MatchDebugInfo {
    /// Documents that passed this match step (and every step before it).
    pub matched_objects: Vec<Document>,
}

#[derive(Debug, Clone, Default)]
pub struct PatchDebugInfo {
    pub patched_objects: Vec<ObjectPatch>,
}

#[derive(Debug, Clone)]
pub struct ObjectPatch {
    pub old: Document,
    pub new: Document,
    /// Merge patch from `old` to `new`; `{}` when the step changed nothing.
    pub patch: Value,
}

impl RuleDebugInfo {
    pub fn new(rule: RuleDescription) -> Self {
        Self {
            matches: vec![MatchDebugInfo::default(); rule.match_rules.len()],
            patches: vec![PatchDebugInfo::default(); rule.patch_rules.len()],
            ignored: Vec::new(),
            rule,
        }
    }

    /// Human-readable listing of each step and the documents it touched.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Rule: {}", self.rule.name);

        for (step, (op, info)) in self.rule.match_rules.iter().zip(&self.matches).enumerate() {
            let _ = writeln!(out, "Match step {step}: {op}");
            for doc in &info.matched_objects {
                let _ = writeln!(out, "    {}", doc.resource_key());
            }
        }
        for (step, (op, info)) in self.rule.patch_rules.iter().zip(&self.patches).enumerate() {
            let _ = writeln!(out, "Patch step {step}: {op}");
            for p in &info.patched_objects {
                let _ = writeln!(out, "    {} -> {}", p.old.resource_key(), p.new.resource_key());
            }
        }
        if !self.ignored.is_empty() {
            let _ = writeln!(out, "Ignored:");
            for doc in &self.ignored {
                let _ = writeln!(out, "    {}", doc.resource_key());
            }
        }
        out
    }
}

impl Recorder for RuleDebugInfo {
    fn record_match(&mut self, step: usize, doc: &Document) {
        if let Some(info) = self.matches.get_mut(step) {
            info.matched_objects.push(doc.clone());
        }
    }

    fn record_patch(&mut self, step: usize, old: &Document, new: &Document) {
        if let Some(info) = self.patches.get_mut(step) {
            info.patched_objects.push(ObjectPatch {
                patch: old.diff(new),
                old: old.clone(),
                new: new.clone(),
            });
        }
    }

    fn record_ignore(&mut self, doc: &Document) {
        self.ignored.push(doc.clone());
    }
}

/// Output of [`DebugInfo::todo_report`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoReport {
    pub rules: Vec<TodoRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoRule {
    pub name: String,
    pub changes: Vec<TodoChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoChange {
    pub resource: ResourceKey,
    pub patch: Value,
}
