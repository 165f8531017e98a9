//! Field groups: sets of fields that must be overridden together.

use confmerge_source_map::FieldPath;
use serde::Serialize;

use crate::report::MergeReport;
use crate::value::ConfigValue;

/// A declared group of fields.
///
/// A path naming a nested map stands for every leaf below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroup {
    paths: Vec<FieldPath>,
}

impl FieldGroup {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    /// Replace every path that is a map in any of `trees` by its leaves.
    ///
    /// Leaves are collected across all trees, in first-seen order, without
    /// duplicates. Paths that are nowhere a map are kept as they are.
    pub fn expand(&self, trees: &[ConfigValue]) -> Vec<FieldPath> {
        let mut leaves: Vec<FieldPath> = Vec::new();
        for path in &self.paths {
            let mut found = false;
            for tree in trees {
                let Some(value) = tree.get_in_maps(path) else {
                    continue;
                };
                if !value.as_map().is_some_and(|entries| !entries.is_empty()) {
                    continue;
                }
                found = true;
                for leaf in value.leaf_paths() {
                    push_unique(&mut leaves, leaf.with_prefix(path));
                }
            }
            if !found {
                push_unique(&mut leaves, path.clone());
            }
        }
        leaves
    }
}

fn push_unique(paths: &mut Vec<FieldPath>, path: FieldPath) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

/// A source that changed some, but not all, fields of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroupViolation {
    /// The group's fields after expansion
    pub group: Vec<FieldPath>,
    /// The source that caused the partial override
    pub source_index: usize,
    /// Fields the source changed, each attributed to that source
    pub changed: Vec<(FieldPath, usize)>,
    /// Fields left untouched, with the source that last set them if any
    pub unchanged: Vec<(FieldPath, Option<usize>)>,
}

/// Checks every source after the first against the merge result so far.
#[derive(Debug, Clone)]
pub struct FieldGroupValidator {
    groups: Vec<Vec<FieldPath>>,
    violations: Vec<FieldGroupViolation>,
}

impl FieldGroupValidator {
    /// Expand `groups` against the union of `trees`.
    pub fn new(groups: &[FieldGroup], trees: &[ConfigValue]) -> Self {
        Self {
            groups: groups.iter().map(|g| g.expand(trees)).collect(),
            violations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Compare `source` with the accumulated tree `merged` before it is merged.
    ///
    /// A field counts as changed when the source defines it with a value
    /// different from the accumulated one.
    pub fn check(
        &mut self,
        merged: &ConfigValue,
        source: &ConfigValue,
        source_index: usize,
        report: &MergeReport,
    ) {
        for group in &self.groups {
            let mut changed = Vec::new();
            let mut unchanged = Vec::new();
            for path in group {
                match source.get_in_maps(path) {
                    None => unchanged.push((path.clone(), report.origin_of(path))),
                    Some(value) if merged.get_in_maps(path) == Some(value) => {
                        let origin = report.origin_of(path).unwrap_or(source_index);
                        unchanged.push((path.clone(), Some(origin)));
                    }
                    Some(_) => changed.push((path.clone(), source_index)),
                }
            }
            if !changed.is_empty() && !unchanged.is_empty() {
                tracing::debug!(source = source_index, "field group partially overridden");
                self.violations.push(FieldGroupViolation {
                    group: group.clone(),
                    source_index,
                    changed,
                    unchanged,
                });
            }
        }
    }

    pub fn finish(self) -> Vec<FieldGroupViolation> {
        self.violations
    }
}
