//! The loading pipeline: read every source, merge, and explain failures.

use confmerge_config::{ConfigError, ConfigValue, MergeSettings, merge_sources};
use confmerge_error_reporting::{
    ConfigLoadError, FieldGroupViolationError, FieldLoadError, MergeConflictFieldError,
};
use confmerge_source_map::FieldPath;
use tracing::{debug, warn};

use crate::loaded::LoadedConfig;
use crate::options::MergeOptions;
use crate::raw::RawSource;

pub(crate) const CONFLICT_MESSAGE: &str = "Conflicting values in multiple sources";

/// Loads the sources described by a [`MergeOptions`] into one tree.
#[derive(Debug, Clone)]
pub struct Loader {
    options: MergeOptions,
}

impl Loader {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Load and merge every source.
    ///
    /// Sources that fail to load are reported together, unless they are
    /// skipped as broken. Merge failures (conflicts, field groups, type
    /// errors from field rules) are reported with the lines that caused them.
    pub fn load(&self) -> Result<LoadedConfig, ConfigLoadError> {
        let (sources, trees) = self.load_sources()?;

        let settings = MergeSettings {
            strategy: self.options.strategy,
            rules: self.options.field_merges.iter().cloned().collect(),
            groups: self.options.field_groups.clone(),
        };

        match merge_sources(&trees, &settings) {
            Ok(outcome) => {
                debug!(
                    name = %self.options.name,
                    sources = sources.len(),
                    fields = outcome.report.len(),
                    "merged configuration"
                );
                Ok(LoadedConfig::new(
                    self.options.name.clone(),
                    outcome.value,
                    sources,
                    outcome.report,
                ))
            }
            Err(err) => Err(self.explain(err, &sources)),
        }
    }

    fn load_sources(&self) -> Result<(Vec<RawSource>, Vec<ConfigValue>), ConfigLoadError> {
        let name = &self.options.name;
        if self.options.sources.is_empty() {
            return Err(self.root_error("No sources configured"));
        }

        let mut sources = Vec::new();
        let mut trees = Vec::new();
        let mut errors = Vec::new();

        for (index, source) in self.options.sources.iter().enumerate() {
            match RawSource::load(index, source) {
                Ok((raw, tree)) => {
                    debug!(
                        index,
                        kind = %raw.kind,
                        file = %source.describe(),
                        keys = ?raw.keys,
                        "loaded source"
                    );
                    sources.push(raw);
                    trees.push(tree);
                }
                Err(err) if self.options.skips(source) => {
                    warn!(
                        error = %err,
                        "[{}] Source {} skipped (broken): file={}",
                        name,
                        index,
                        source.describe()
                    );
                }
                Err(err) => {
                    errors.push(
                        FieldLoadError::new(FieldPath::root(), err.to_string())
                            .with_location(source.file_location()),
                    );
                }
            }
        }

        if !errors.is_empty() {
            return Err(ConfigLoadError::Loading {
                name: name.clone(),
                errors,
            });
        }
        if sources.is_empty() {
            return Err(self.root_error(format!(
                "All {} source(s) failed to load",
                self.options.sources.len()
            )));
        }
        Ok((sources, trees))
    }

    fn root_error(&self, message: impl Into<String>) -> ConfigLoadError {
        ConfigLoadError::Loading {
            name: self.options.name.clone(),
            errors: vec![FieldLoadError::new(FieldPath::root(), message)],
        }
    }

    /// Turn a merge failure into a report; `sources` is indexed like the merged trees.
    fn explain(&self, err: ConfigError, sources: &[RawSource]) -> ConfigLoadError {
        let name = self.options.name.clone();
        match err {
            ConfigError::MergeTypes(type_errors) => ConfigLoadError::Loading {
                name,
                errors: type_errors
                    .into_iter()
                    .map(|error| {
                        let location = sources
                            .get(error.source_index)
                            .and_then(|s| s.locate(&error.path));
                        FieldLoadError::new(error.path, error.message).with_location(location)
                    })
                    .collect(),
            },
            ConfigError::Conflicts(records) => ConfigLoadError::MergeConflict {
                name,
                conflicts: records
                    .into_iter()
                    .map(|record| MergeConflictFieldError {
                        locations: record
                            .sources
                            .iter()
                            .filter_map(|&i| sources.get(i)?.locate(&record.path))
                            .collect(),
                        path: record.path,
                        message: CONFLICT_MESSAGE.to_string(),
                    })
                    .collect(),
            },
            ConfigError::FieldGroups(violations) => {
                let repr = |index: usize| {
                    sources
                        .get(index)
                        .map_or_else(|| "none".to_string(), RawSource::repr)
                };
                ConfigLoadError::FieldGroup {
                    name,
                    violations: violations
                        .into_iter()
                        .map(|v| FieldGroupViolationError {
                            group: v.group,
                            source_index: sources.get(v.source_index).map_or(v.source_index, |s| s.index),
                            changed: v.changed.into_iter().map(|(p, i)| (p, repr(i))).collect(),
                            unchanged: v
                                .unchanged
                                .into_iter()
                                .map(|(p, origin)| (p, origin.map_or_else(|| "none".to_string(), repr)))
                                .collect(),
                        })
                        .collect(),
                }
            }
            other => self.root_error(other.to_string()),
        }
    }
}
