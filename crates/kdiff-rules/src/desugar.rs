//! Rule desugaring.
//!
//! Two expansions turn authored rules into the canonical form the engine runs:
//! 1) shorthands (`renameObject`, `removeField`, `renameField`) become a match
//!    step plus a patch step;
//! 2) matchers (`matchers: {path: [v1, v2, ...]}`) specialize the rule once per
//!    value, as the cross product over all matchers of the rule.
//!
//! Both are pure and order-preserving: output rules appear in the order the
//! values were declared, matchers expanding in declaration order.

use serde_json::Value;

use crate::schema::{
    display_name, IgnoreRule, MatchStep, Operation, PatchRule, Rename, RuleError, RuleSet,
};

const METADATA_NAME: &str = "/metadata/name";

/// Expand one patch rule into its canonical specializations.
///
/// A canonical rule (no shorthand, no matchers) comes back unchanged as a
/// single-element list.
pub fn desugar(mut rule: PatchRule) -> Result<Vec<PatchRule>, RuleError> {
    expand_shorthand(&mut rule)?;
    let name = rule.name.clone();
    expand_matchers(rule, &name, |r| &mut r.match_steps)
}

/// Expand the matchers of one ignore rule. Ignore rules have no shorthands.
pub fn desugar_ignore(rule: IgnoreRule) -> Result<Vec<IgnoreRule>, RuleError> {
    let name = rule.name.clone();
    expand_matchers(rule, &name, |r| &mut r.match_steps)
}

impl RuleSet {
    /// Desugar every rule, flattening the expansions in place of the
    /// originals.
    pub fn desugar(self) -> Result<RuleSet, RuleError> {
        let mut out = RuleSet::default();
        for rule in self.ignore_rules {
            out.ignore_rules.extend(desugar_ignore(rule)?);
        }
        for rule in self.patch_rules {
            out.patch_rules.extend(desugar(rule)?);
        }
        Ok(out)
    }
}

fn expand_shorthand(rule: &mut PatchRule) -> Result<(), RuleError> {
    let set: Vec<&str> = [
        ("renameObject", rule.rename_object.is_some()),
        ("removeField", rule.remove_field.is_some()),
        ("renameField", rule.rename_field.is_some()),
    ]
    .into_iter()
    .filter_map(|(field, present)| present.then_some(field))
    .collect();

    if set.len() > 1 {
        return Err(RuleError::AmbiguousShorthand {
            rule: display_name(&rule.name),
            fields: set.join(", "),
        });
    }
    if let [field] = set[..] {
        if !rule.match_steps.is_empty() || !rule.steps.is_empty() {
            return Err(RuleError::ShorthandWithSteps {
                rule: display_name(&rule.name),
                field: field.to_string(),
            });
        }
    }

    if let Some(Rename { from, to }) = rule.rename_object.take() {
        rule.match_steps
            .push(Operation::test(METADATA_NAME, Value::String(from.clone())).into());
        rule.steps
            .push(Operation::replace(METADATA_NAME, Value::String(to.clone())));
        default_name(rule, || format!("Rename {from} to {to}"));
    }

    if let Some(path) = rule.remove_field.take() {
        // A `remove` match step matches exactly the documents that have the field.
        rule.match_steps.push(Operation::remove(path.clone()).into());
        rule.steps.push(Operation::remove(path.clone()));
        default_name(rule, || format!("Remove {path}"));
    }

    if let Some(Rename { from, to }) = rule.rename_field.take() {
        rule.match_steps.push(Operation::remove(from.clone()).into());
        rule.steps.push(Operation::move_field(from.clone(), to.clone()));
        default_name(rule, || format!("Rename {from} to {to}"));
    }

    Ok(())
}

fn default_name(rule: &mut PatchRule, name: impl FnOnce() -> String) {
    if rule.name.is_empty() {
        rule.name = name();
    }
}

fn expand_matchers<R: Clone>(
    mut rule: R,
    name: &str,
    steps_of: impl Fn(&mut R) -> &mut Vec<MatchStep>,
) -> Result<Vec<R>, RuleError> {
    let matchers = collect_matchers(name, steps_of(&mut rule))?;

    let mut rules = vec![rule];
    for (path, values) in matchers {
        let mut next = Vec::with_capacity(rules.len() * values.len());
        for subject in &rules {
            for value in &values {
                let mut specialized = subject.clone();
                specialize(steps_of(&mut specialized), &path, value);
                next.push(specialized);
            }
        }
        rules = next;
    }
    Ok(rules)
}

/// Matchers in declaration order. When several steps declare a matcher for
/// the same path, the first declaration wins and the others are superseded.
fn collect_matchers(name: &str, steps: &[MatchStep]) -> Result<Vec<(String, Vec<Value>)>, RuleError> {
    let mut out: Vec<(String, Vec<Value>)> = Vec::new();

    for (step, m) in steps.iter().enumerate() {
        if m.op.is_none() && m.matchers.is_empty() {
            return Err(RuleError::MissingOp {
                rule: display_name(name),
                step,
            });
        }
        for (path, values) in &m.matchers {
            if values.is_empty() {
                return Err(RuleError::EmptyMatcher {
                    rule: display_name(name),
                    path: path.clone(),
                });
            }
            if !out.iter().any(|(p, _)| p == path) {
                out.push((path.clone(), values.clone()));
            }
        }
    }
    Ok(out)
}

/// Replace every matcher entry for `path` with a concrete `test` step.
///
/// Steps left with neither an op nor matchers only existed to carry the
/// matcher and are dropped.
fn specialize(steps: &mut Vec<MatchStep>, path: &str, value: &Value) {
    for step in steps.iter_mut() {
        step.matchers.shift_remove(path);
    }
    steps.retain(|step| step.op.is_some() || !step.matchers.is_empty());
    steps.push(Operation::test(path, value.clone()).into());
}
