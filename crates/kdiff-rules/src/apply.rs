use kdiff_core::model::{Document, ResourceKey};
use tracing::{debug, trace};

use crate::debug::{DebugError, DebugInfo, NoopRecorder, Recorder};
use crate::operation::OperationError;
use crate::schema::{RuleDescription, RuleError, RuleKind, RuleSet};

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("rule '{rule}' patch step {step} ({operation}) failed on {resource}: {source}")]
    Patch {
        rule: String,
        step: usize,
        operation: String,
        resource: ResourceKey,
        #[source]
        source: OperationError,
    },

    /// A `test` inside `steps` is an assertion, not a filter.
    #[error("rule '{rule}' patch step {step} ({operation}) does not hold on {resource}")]
    TestFailed {
        rule: String,
        step: usize,
        operation: String,
        resource: ResourceKey,
    },

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Debug(#[from] DebugError),
}

impl RuleDescription {
    /// Run this rule against one document.
    ///
    /// Semantics:
    /// - match steps are evaluated in order; the first that fails leaves the
    ///   document untouched and it is returned as is
    /// - a fully matched document is dropped by an ignore rule (`Ok(None)`)
    ///   and patched in place by a patch rule
    /// - every successful match step and every patch step is reported to
    ///   `recorder`
    pub fn map_object(
        &self,
        mut doc: Document,
        recorder: &mut dyn Recorder,
    ) -> Result<Option<Document>, ApplyError> {
        for (step, op) in self.match_rules.iter().enumerate() {
            if !op.matches(&doc.object) {
                trace!(rule = %self.name, step, resource = %doc.resource_key(), "no match");
                return Ok(Some(doc));
            }
            recorder.record_match(step, &doc);
        }

        if self.kind == RuleKind::Ignore {
            recorder.record_ignore(&doc);
            return Ok(None);
        }

        for (step, op) in self.patch_rules.iter().enumerate() {
            let old = doc.clone();
            let held = op.apply(&mut doc.object).map_err(|source| ApplyError::Patch {
                rule: self.name.clone(),
                step,
                operation: op.to_string(),
                resource: old.resource_key(),
                source,
            })?;
            if !held {
                return Err(ApplyError::TestFailed {
                    rule: self.name.clone(),
                    step,
                    operation: op.to_string(),
                    resource: old.resource_key(),
                });
            }
            recorder.record_patch(step, &old, &doc);
        }

        Ok(Some(doc))
    }
}

/// Apply every rule of `rule_set` to `documents`, ignore rules first, each
/// rule seeing the output of the previous one.
///
/// `rule_set` must already be desugared. With `debug` set, the input is
/// snapshotted as initial objects and every rule records into its slot.
pub fn apply_rule_set(
    documents: Vec<Document>,
    rule_set: &RuleSet,
    mut debug: Option<&mut DebugInfo>,
) -> Result<Vec<Document>, ApplyError> {
    let rules = rule_set.describe()?;

    if let Some(info) = debug.as_deref_mut() {
        info.add_initial_objects(&documents);
    }

    let mut current = documents;
    for (index, rule) in rules.iter().enumerate() {
        let mut noop = NoopRecorder;
        let recorder: &mut dyn Recorder = match debug.as_deref_mut() {
            Some(info) => info.rule_debug_info(index, rule)?,
            None => &mut noop,
        };

        let before = current.len();
        let mut next = Vec::with_capacity(before);
        for doc in current {
            if let Some(doc) = rule.map_object(doc, recorder)? {
                next.push(doc);
            }
        }

        debug!(
            rule = %rule.name,
            kind = %rule.kind,
            documents = before,
            dropped = before - next.len(),
            "applied rule"
        );
        current = next;
    }

    Ok(current)
}
