//! Conflict detection for the `raise_on_conflict` strategy.

use confmerge_source_map::FieldPath;
use indexmap::IndexMap;
use serde::Serialize;

use crate::types::FieldMergeRules;
use crate::value::ConfigValue;

/// A field whose value differs across two or more sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub path: FieldPath,
    /// Indices of every source that set the field, in source order
    pub sources: Vec<usize>,
}

/// Find every path where sources disagree.
///
/// A path conflicts when at least two sources define it, not all of those
/// values are maps, and the values are not all equal. When they are all
/// maps the check descends into them. Paths with a field rule are skipped
/// together with everything below them.
pub fn detect_conflicts(trees: &[ConfigValue], rules: &FieldMergeRules) -> Vec<ConflictRecord> {
    let contributions: Vec<(usize, &ConfigValue)> = trees.iter().enumerate().collect();
    let mut out = Vec::new();
    collect(&contributions, &mut Vec::new(), rules, &mut out);
    if !out.is_empty() {
        tracing::debug!(count = out.len(), "conflicting fields detected");
    }
    out
}

fn collect(
    contributions: &[(usize, &ConfigValue)],
    path: &mut Vec<String>,
    rules: &FieldMergeRules,
    out: &mut Vec<ConflictRecord>,
) {
    let mut by_key: IndexMap<&str, Vec<(usize, &ConfigValue)>> = IndexMap::new();
    for (index, value) in contributions {
        if let ConfigValue::Map(entries) = value {
            for (key, child) in entries {
                by_key.entry(key.as_str()).or_default().push((*index, child));
            }
        }
    }

    for (key, values) in by_key {
        if values.len() < 2 {
            continue;
        }
        path.push(key.to_string());
        if !rules.contains(&path.join(".")) {
            if values.iter().all(|(_, v)| v.is_map()) {
                collect(&values, path, rules, out);
            } else {
                let first = values[0].1;
                if values[1..].iter().any(|(_, v)| *v != first) {
                    out.push(ConflictRecord {
                        path: FieldPath::from(path.clone()),
                        sources: values.iter().map(|(index, _)| *index).collect(),
                    });
                }
            }
        }
        path.pop();
    }
}
