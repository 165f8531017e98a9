//! Provenance of merged values.

use confmerge_source_map::FieldPath;
use indexmap::IndexMap;
use serde::Serialize;

use crate::types::MergeStrategy;
use crate::value::ConfigValue;

/// Which sources contributed each leaf of the merged tree.
///
/// Keys are dotted leaf paths; the values are source indices in the order
/// they contributed. For most leaves there is exactly one contributor, list
/// strategies such as `append` record every source whose items were kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    pub strategy: MergeStrategy,
    origins: IndexMap<String, Vec<usize>>,
}

impl MergeReport {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            origins: IndexMap::new(),
        }
    }

    /// Every recorded leaf with its contributing sources.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.origins
            .iter()
            .map(|(path, sources)| (path.as_str(), sources.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Contributors recorded for exactly this leaf path.
    pub fn sources_of(&self, path: &FieldPath) -> &[usize] {
        self.origins
            .get(&path.dotted())
            .map_or(&[], Vec::as_slice)
    }

    /// The source that last set the leaf at `path`.
    pub fn origin_of(&self, path: &FieldPath) -> Option<usize> {
        self.sources_of(path).last().copied()
    }

    /// Best source to blame for `path`, which need not be a recorded leaf.
    ///
    /// Exact leaves come first, then the latest source among leaves below
    /// `path`, then the nearest recorded ancestor (for paths into a list).
    pub fn attribute(&self, path: &FieldPath) -> Option<usize> {
        if let Some(origin) = self.origin_of(path) {
            return Some(origin);
        }
        let dotted = path.dotted();
        let below = self
            .origins
            .iter()
            .filter(|(leaf, _)| is_descendant(leaf, &dotted))
            .filter_map(|(_, sources)| sources.last().copied())
            .max();
        if below.is_some() {
            return below;
        }
        let segments = path.segments();
        (0..segments.len()).rev().find_map(|len| {
            let ancestor = FieldPath::from(segments[..len].to_vec());
            self.origin_of(&ancestor)
        })
    }

    /// Record `value` as coming entirely from `source`.
    pub(crate) fn record_subtree(&mut self, dotted: &str, value: &ConfigValue, source: usize) {
        match value {
            ConfigValue::Map(entries) if !entries.is_empty() => {
                for (key, child) in entries {
                    self.record_subtree(&join(dotted, key), child, source);
                }
            }
            _ => {
                self.origins.insert(dotted.to_string(), vec![source]);
            }
        }
    }

    /// Record `value` from `source` in place of `previous`, the value it overrides.
    ///
    /// Leaves below `dotted` exist only when `previous` is a non-empty map;
    /// otherwise the single entry at `dotted` is overwritten where it stands.
    pub(crate) fn replace_subtree(
        &mut self,
        dotted: &str,
        previous: &ConfigValue,
        value: &ConfigValue,
        source: usize,
    ) {
        if is_branch(previous) {
            self.origins
                .retain(|leaf, _| leaf != dotted && !is_descendant(leaf, dotted));
        } else if is_branch(value) {
            self.origins.shift_remove(dotted);
        }
        self.record_subtree(dotted, value, source);
    }

    pub(crate) fn forget(&mut self, dotted: &str) {
        self.origins.shift_remove(dotted);
    }

    /// Add `source` as a further contributor of the leaf at `dotted`.
    pub(crate) fn add_contributor(&mut self, dotted: &str, source: usize) {
        let sources = self.origins.entry(dotted.to_string()).or_default();
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn is_branch(value: &ConfigValue) -> bool {
    value.as_map().is_some_and(|entries| !entries.is_empty())
}

fn is_descendant(leaf: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    leaf.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('.'))
}
