//! The result of a successful load.

use confmerge_config::{ConfigValue, MergeReport, MergeStrategy};
use confmerge_error_reporting::{ConfigLoadError, FieldLoadError};
use confmerge_source_map::{FieldPath, SourceKind, SourceLocation};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;
use std::path::PathBuf;

use crate::raw::RawSource;

/// A field problem found by whatever maps the merged tree onto a typed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorInfo {
    pub path: FieldPath,
    pub message: String,
}

impl FieldErrorInfo {
    pub fn new(path: impl Into<FieldPath>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A merged configuration that still knows where each value came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    name: String,
    value: ConfigValue,
    sources: Vec<RawSource>,
    merge: MergeReport,
}

impl LoadedConfig {
    pub(crate) fn new(name: String, value: ConfigValue, sources: Vec<RawSource>, merge: MergeReport) -> Self {
        Self {
            name,
            value,
            sources,
            merge,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ConfigValue {
        &self.value
    }

    pub fn into_value(self) -> ConfigValue {
        self.value
    }

    /// The sources that were loaded, skipped ones excluded.
    pub fn sources(&self) -> &[RawSource] {
        &self.sources
    }

    /// The loaded source that last set `path`, falling back to the last source.
    pub fn origin_of(&self, path: &FieldPath) -> Option<&RawSource> {
        self.merge
            .attribute(path)
            .and_then(|i| self.sources.get(i))
            .or_else(|| self.sources.last())
    }

    /// Where the value at `path` was defined.
    pub fn locate(&self, path: &FieldPath) -> Option<SourceLocation> {
        self.origin_of(path)?.locate(path)
    }

    /// Turn field problems into a load error pointing at the responsible lines.
    pub fn enrich_errors(&self, errors: Vec<FieldErrorInfo>) -> ConfigLoadError {
        let errors = errors
            .into_iter()
            .map(|info| {
                let location = self.locate(&info.path);
                FieldLoadError::new(info.path, info.message).with_location(location)
            })
            .collect();
        ConfigLoadError::Loading {
            name: self.name.clone(),
            errors,
        }
    }

    /// Deserialize the merged tree into `T`.
    ///
    /// A failure is reported at the field serde rejected, located in the
    /// source that set that field.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, ConfigLoadError> {
        serde_path_to_error::deserialize(self.value.to_json()).map_err(|err| {
            let path = field_path(err.path());
            let location = self.locate(&path);
            ConfigLoadError::Loading {
                name: self.name.clone(),
                errors: vec![FieldLoadError::new(path, err.inner().to_string()).with_location(location)],
            }
        })
    }

    /// Which source produced each value, as a serializable summary.
    pub fn report(&self) -> LoadReport {
        let configured = |i: usize| self.sources.get(i).map_or(i, |s| s.index);
        LoadReport {
            name: self.name.clone(),
            strategy: self.merge.strategy,
            sources: self
                .sources
                .iter()
                .map(|s| SourceSummary {
                    index: s.index,
                    kind: s.kind,
                    file: s.file.clone(),
                    keys: s.keys.clone(),
                })
                .collect(),
            fields: self
                .merge
                .iter()
                .map(|(path, origins)| {
                    (path.to_string(), origins.iter().map(|&i| configured(i)).collect())
                })
                .collect(),
        }
    }
}

/// The dotted field path of a deserialization error.
fn field_path(path: &serde_path_to_error::Path) -> FieldPath {
    let segments: Vec<String> = path
        .iter()
        .filter_map(|segment| match segment {
            Segment::Map { key } => Some(key.clone()),
            Segment::Seq { index } => Some(index.to_string()),
            Segment::Enum { variant } => Some(variant.clone()),
            _ => None,
        })
        .collect();
    FieldPath::from(segments)
}

/// Provenance of a load. Source indices refer to the configured source list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub name: String,
    pub strategy: MergeStrategy,
    pub sources: Vec<SourceSummary>,
    /// Dotted leaf path to the sources that produced its value
    pub fields: IndexMap<String, Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub index: usize,
    pub kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub keys: Vec<String>,
}
