use kdiff_core::merge_patch;
use kdiff_core::model::{Document, ResourceKey};

use crate::debug::{DebugInfo, RuleDebugInfo};
use crate::diagnostics::{
    EffectivenessError, EffectivenessFinding, IneffectiveMatchError, IneffectivePatchError,
};

impl RuleDebugInfo {
    /// Check that every step of this rule did something.
    ///
    /// Rules:
    /// - a match step is ineffective when it matched no document; only the
    ///   first such step is reported, the following steps saw no candidates
    /// - a patch step is ineffective when it patched no document, or when
    ///   every diff it recorded is empty
    pub fn validate_all_steps_were_effective(
        &self,
        initial_objects: &[Document],
    ) -> Result<(), EffectivenessError> {
        EffectivenessError::from_findings(self.findings(initial_objects))
    }

    fn findings(&self, initial_objects: &[Document]) -> Vec<EffectivenessFinding> {
        let mut candidates = initial_objects;

        for (step, info) in self.matches.iter().enumerate() {
            if info.matched_objects.is_empty() {
                return vec![
                    IneffectiveMatchError {
                        rule_name: self.rule.name.clone(),
                        step,
                        previous_candidates: keys(candidates),
                        match_rule: self.rule.match_rules[step].clone(),
                    }
                    .into(),
                ];
            }
            candidates = &info.matched_objects;
        }

        self.patches
            .iter()
            .enumerate()
            .filter(|(_, info)| {
                info.patched_objects
                    .iter()
                    .all(|p| merge_patch::is_empty(&p.patch))
            })
            .map(|(step, _)| {
                IneffectivePatchError {
                    rule_name: self.rule.name.clone(),
                    step,
                    previous_candidates: keys(candidates),
                    patch_rule: self.rule.patch_rules[step].clone(),
                }
                .into()
            })
            .collect()
    }
}

impl DebugInfo {
    /// Validate every rule that ran, collecting all findings.
    pub fn validate_all_rules_were_effective(&self) -> Result<(), EffectivenessError> {
        let findings = self
            .rules()
            .flat_map(|info| info.findings(self.initial_objects()))
            .collect();
        EffectivenessError::from_findings(findings)
    }
}

fn keys(documents: &[Document]) -> Vec<ResourceKey> {
    documents.iter().map(Document::resource_key).collect()
}
