//! Locate the lines behind a configuration value.
//!
//! Once a configuration has been parsed and merged, values no longer know
//! where they came from. This crate answers "which lines of this file
//! produced the value at `database.port`?" by rescanning the raw text of a
//! source on demand, without building a parse tree.
//!
//! Five scanners share one contract, selected through [`PathFinder`]:
//!
//! - JSON and JSON5: a single character pass with a container stack
//! - INI, TOML and YAML: a single line pass with per-format continuation rules
//!
//! [`resolve_source_location`] combines a scanner with a source's identity
//! (file path, env prefix) to produce a [`SourceLocation`] with an excerpt.
//!
//! Scanners are best-effort diagnostics. Malformed text never panics; it
//! simply yields no range.
//!
//! # Example
//!
//! ```rust
//! use confmerge_locate::PathFinder;
//! use confmerge_source_map::{LineRange, SourceKind};
//!
//! let text = "[database]\nhost = \"db\"\nport = 5432\n";
//! let finder = PathFinder::for_kind(SourceKind::Toml).unwrap();
//! let path = vec!["database".to_string(), "port".to_string()];
//! assert_eq!(finder.find_line_range(text, &path), Some(LineRange::single(3)));
//! ```
//!
//! [`SourceLocation`]: confmerge_source_map::SourceLocation

mod envfile;
mod ini;
mod lines;
mod resolver;
mod structural;
mod toml;
mod yaml;

pub use envfile::find_env_var;
pub use resolver::{
    DEFAULT_SPLIT_SYMBOLS, SourceContext, env_var_name, resolve_source_location, search_path,
};

use confmerge_source_map::{LineRange, SourceKind};
use lines::scan_lines;
use structural::Dialect;

/// The closed set of path scanners, one per textual format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFinder {
    Json,
    Json5,
    Toml,
    Yaml,
    Ini,
}

impl PathFinder {
    /// The scanner for a source kind; environment sources have none.
    pub fn for_kind(kind: SourceKind) -> Option<PathFinder> {
        match kind {
            SourceKind::Json => Some(PathFinder::Json),
            SourceKind::Json5 => Some(PathFinder::Json5),
            SourceKind::Toml => Some(PathFinder::Toml),
            SourceKind::Yaml => Some(PathFinder::Yaml),
            SourceKind::Ini => Some(PathFinder::Ini),
            SourceKind::Env | SourceKind::EnvFile => None,
        }
    }

    /// Find the 1-based inclusive line range of the value at `path` in `text`.
    ///
    /// Returns `None` when the path is empty or not present.
    pub fn find_line_range(&self, text: &str, path: &[String]) -> Option<LineRange> {
        match self {
            PathFinder::Json => structural::find_line_range(text, path, Dialect::Json),
            PathFinder::Json5 => structural::find_line_range(text, path, Dialect::Json5),
            PathFinder::Toml => scan_lines(toml::TomlScanner::default(), text, path),
            PathFinder::Yaml => scan_lines(yaml::YamlScanner::default(), text, path),
            PathFinder::Ini => scan_lines(ini::IniScanner::default(), text, path),
        }
    }
}
