//! The full merge pass: conflicts, field groups, then the fold.

use serde::Serialize;

use crate::conflict::detect_conflicts;
use crate::field_group::{FieldGroup, FieldGroupValidator};
use crate::merge::Merger;
use crate::report::MergeReport;
use crate::types::{ConfigError, FieldMergeRules, MergeStrategy};
use crate::value::ConfigValue;

/// Everything that controls how a list of trees is combined.
#[derive(Debug, Clone, Default)]
pub struct MergeSettings {
    pub strategy: MergeStrategy,
    pub rules: FieldMergeRules,
    pub groups: Vec<FieldGroup>,
}

/// A merged tree with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub value: ConfigValue,
    pub report: MergeReport,
}

/// Merge `trees` in order.
///
/// Under `RaiseOnConflict` every conflict is reported before anything is
/// merged. Field groups are checked against the accumulated tree before
/// each source after the first is merged in, and all violations are
/// reported together once the fold completes. Type errors from field rules
/// are collected the same way; when any occur they are reported in place of
/// group violations.
pub fn merge_sources(
    trees: &[ConfigValue],
    settings: &MergeSettings,
) -> Result<MergeOutcome, ConfigError> {
    if settings.strategy == MergeStrategy::RaiseOnConflict {
        let conflicts = detect_conflicts(trees, &settings.rules);
        if !conflicts.is_empty() {
            return Err(ConfigError::Conflicts(conflicts));
        }
    }

    let mut validator = FieldGroupValidator::new(&settings.groups, trees);
    let mut merger = Merger::new(settings.strategy, &settings.rules);
    let mut value = ConfigValue::empty_map();

    for (index, tree) in trees.iter().enumerate() {
        if index > 0 && !validator.is_empty() {
            validator.check(&value, tree, index, merger.report());
        }
        value = merger.merge_source(value, tree, index);
        tracing::trace!(source = index, "merged source");
    }

    let type_errors = merger.take_errors();
    if !type_errors.is_empty() {
        return Err(ConfigError::MergeTypes(type_errors));
    }

    let violations = validator.finish();
    if !violations.is_empty() {
        return Err(ConfigError::FieldGroups(violations));
    }

    Ok(MergeOutcome {
        value,
        report: merger.into_report(),
    })
}
