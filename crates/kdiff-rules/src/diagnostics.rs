use std::fmt;

use kdiff_core::model::ResourceKey;
use serde::Serialize;

use crate::schema::Operation;

/// A match step that matched no document.
///
/// `previous_candidates` is the set entering the step: the whole initial
/// corpus for step 0, otherwise what the previous step matched.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error(
    "rule {rule_name:?} matching step {step}:\n\t {match_rule} did not match any objects in:\n\t\t{}",
    join_candidates(.previous_candidates)
)]
pub struct IneffectiveMatchError {
    pub rule_name: String,
    pub step: usize,
    pub previous_candidates: Vec<ResourceKey>,
    pub match_rule: Operation,
}

/// A patch step that patched nothing, or whose every recorded diff was empty.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error(
    "rule {rule_name:?} patching step {step}:\n\t {patch_rule} did not change any objects in:\n\t\t{}",
    join_candidates(.previous_candidates)
)]
pub struct IneffectivePatchError {
    pub rule_name: String,
    pub step: usize,
    pub previous_candidates: Vec<ResourceKey>,
    pub patch_rule: Operation,
}

fn join_candidates(candidates: &[ResourceKey]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\t\t")
}

/// One ineffectiveness finding, tagged with a stable machine-readable code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum EffectivenessFinding {
    IneffectiveMatch(IneffectiveMatchError),
    IneffectivePatch(IneffectivePatchError),
}

impl EffectivenessFinding {
    pub fn rule_name(&self) -> &str {
        match self {
            EffectivenessFinding::IneffectiveMatch(e) => &e.rule_name,
            EffectivenessFinding::IneffectivePatch(e) => &e.rule_name,
        }
    }

    pub fn step(&self) -> usize {
        match self {
            EffectivenessFinding::IneffectiveMatch(e) => e.step,
            EffectivenessFinding::IneffectivePatch(e) => e.step,
        }
    }
}

impl fmt::Display for EffectivenessFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectivenessFinding::IneffectiveMatch(e) => e.fmt(f),
            EffectivenessFinding::IneffectivePatch(e) => e.fmt(f),
        }
    }
}

impl From<IneffectiveMatchError> for EffectivenessFinding {
    fn from(e: IneffectiveMatchError) -> Self {
        EffectivenessFinding::IneffectiveMatch(e)
    }
}

impl From<IneffectivePatchError> for EffectivenessFinding {
    fn from(e: IneffectivePatchError) -> Self {
        EffectivenessFinding::IneffectivePatch(e)
    }
}

/// Every ineffectiveness finding of a run.
///
/// Findings are collected across all rules rather than failing on the first,
/// so a single run reports every stale rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectivenessError {
    pub findings: Vec<EffectivenessFinding>,
}

impl EffectivenessError {
    /// `Ok(())` when there is nothing to report.
    pub fn from_findings(findings: Vec<EffectivenessFinding>) -> Result<(), Self> {
        if findings.is_empty() {
            Ok(())
        } else {
            Err(Self { findings })
        }
    }
}

impl fmt::Display for EffectivenessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ineffective rule step(s):", self.findings.len())?;
        for finding in &self.findings {
            writeln!(f, "{finding}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EffectivenessError {}
