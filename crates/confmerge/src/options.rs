//! Options for one load.

use confmerge_config::{FieldGroup, FieldMergeRule, MergeStrategy};

use crate::source::Source;

/// Everything that describes a configuration load.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Name of the configuration, used to head error reports
    pub name: String,
    /// Sources in merge order; later sources override earlier ones under `LastWins`
    pub sources: Vec<Source>,
    pub strategy: MergeStrategy,
    pub field_merges: Vec<FieldMergeRule>,
    pub field_groups: Vec<FieldGroup>,
    /// Default for sources that do not set `skip_if_broken` themselves
    pub skip_broken_sources: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            name: "Config".to_string(),
            sources: Vec::new(),
            strategy: MergeStrategy::default(),
            field_merges: Vec::new(),
            field_groups: Vec::new(),
            skip_broken_sources: false,
        }
    }
}

impl MergeOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn field_merge(mut self, rule: FieldMergeRule) -> Self {
        self.field_merges.push(rule);
        self
    }

    pub fn field_group(mut self, group: FieldGroup) -> Self {
        self.field_groups.push(group);
        self
    }

    pub fn skip_broken_sources(mut self, skip: bool) -> Self {
        self.skip_broken_sources = skip;
        self
    }

    pub(crate) fn skips(&self, source: &Source) -> bool {
        source.skip_if_broken.unwrap_or(self.skip_broken_sources)
    }
}
