//! Deep merging of configuration trees loaded from several sources.
//!
//! Each source is parsed into a [`ConfigValue`] tree. [`merge_sources`]
//! folds them left to right into one tree, under a global
//! [`MergeStrategy`] refined by per-path [`FieldMergeRule`]s. Along the way
//! it records a [`MergeReport`] naming the source of every merged leaf.
//!
//! Two checks run around the fold:
//!
//! - [`detect_conflicts`] rejects differing leaf values when the strategy is
//!   [`MergeStrategy::RaiseOnConflict`]
//! - [`FieldGroupValidator`] rejects sources that override only part of a
//!   [`FieldGroup`]
//!
//! # Example
//!
//! ```rust
//! use confmerge_config::{ConfigValue, MergeSettings, merge_sources};
//! use serde_json::json;
//!
//! let trees = vec![
//!     ConfigValue::from(json!({"db": {"host": "localhost", "port": 5432}})),
//!     ConfigValue::from(json!({"db": {"host": "prod"}})),
//! ];
//! let merged = merge_sources(&trees, &MergeSettings::default()).unwrap();
//! assert_eq!(merged.value, ConfigValue::from(json!({"db": {"host": "prod", "port": 5432}})));
//! ```

mod types;
mod value;
mod merge;
mod conflict;
mod field_group;
mod report;
mod pipeline;

pub use types::{
    ConfigError,
    FieldMergeRule,
    FieldMergeRules,
    FieldMergeStrategy,
    MergeStrategy,
    MergeTypeError,
};

pub use value::ConfigValue;

pub use merge::{Merger, apply_field_merge, deep_merge};

pub use conflict::{ConflictRecord, detect_conflicts};

pub use field_group::{FieldGroup, FieldGroupValidator, FieldGroupViolation};

pub use report::MergeReport;

pub use pipeline::{MergeOutcome, MergeSettings, merge_sources};

pub use confmerge_source_map::FieldPath;
