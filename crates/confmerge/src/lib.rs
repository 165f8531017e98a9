//! Load configuration from several sources, merge it, and explain failures
//! down to the line that caused them.
//!
//! A load is described by [`MergeOptions`]: an ordered list of [`Source`]s
//! (files in JSON, JSON5, TOML, YAML, INI or dotenv format, inline text, or
//! the process environment), a [`MergeStrategy`], per-field
//! [`FieldMergeRule`]s and [`FieldGroup`]s. [`Loader::load`] reads every
//! source, merges the trees and returns a [`LoadedConfig`], or a
//! [`ConfigLoadError`] whose text names each offending field with its file,
//! line range and an excerpt.
//!
//! # Example
//!
//! ```rust
//! use confmerge::{Loader, MergeOptions, Source, SourceKind};
//!
//! let options = MergeOptions::new("App")
//!     .source(Source::inline(SourceKind::Toml, "defaults.toml", "[db]\nhost = \"localhost\"\nport = 5432\n"))
//!     .source(Source::inline(SourceKind::Yaml, "local.yaml", "db:\n  host: db.internal\n"));
//!
//! let loaded = Loader::new(options).load().unwrap();
//! assert_eq!(loaded.value().to_json()["db"]["host"], "db.internal");
//! assert_eq!(loaded.report().fields["db.port"], vec![0]);
//! ```

mod loaded;
mod loader;
mod options;
mod raw;
mod source;

pub use loaded::{FieldErrorInfo, LoadReport, LoadedConfig, SourceSummary};
pub use loader::Loader;
pub use options::MergeOptions;
pub use raw::RawSource;
pub use source::{Source, SourceError, SourceOrigin};

pub use confmerge_config::{
    ConfigValue, FieldGroup, FieldMergeRule, FieldMergeStrategy, MergeStrategy,
};
pub use confmerge_error_reporting::ConfigLoadError;
pub use confmerge_source_map::{FieldPath, SourceKind, SourceLocation};
