//! Core types for source locations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A range of lines in source text.
///
/// Both ends are 1-based and inclusive; `start == end` for single-line values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineRange {
    /// First line (1-based)
    pub start: usize,
    /// Last line (1-based, inclusive)
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        LineRange {
            start,
            end: end.max(start),
        }
    }

    pub fn single(line: usize) -> Self {
        LineRange {
            start: line,
            end: line,
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.start == self.end
    }

    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(f, "line {}", self.start)
        } else {
            write!(f, "line {}-{}", self.start, self.end)
        }
    }
}

/// The textual format a configuration source was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Json,
    Json5,
    Toml,
    Yaml,
    Ini,
    /// Process environment variables
    Env,
    /// A `KEY=value` dotenv file
    EnvFile,
}

impl SourceKind {
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Json,
        SourceKind::Json5,
        SourceKind::Toml,
        SourceKind::Yaml,
        SourceKind::Ini,
        SourceKind::Env,
        SourceKind::EnvFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Json => "json",
            SourceKind::Json5 => "json5",
            SourceKind::Toml => "toml",
            SourceKind::Yaml => "yaml",
            SourceKind::Ini => "ini",
            SourceKind::Env => "env",
            SourceKind::EnvFile => "envfile",
        }
    }

    /// Whether values of this kind live in a file whose text can be scanned.
    pub fn has_text(&self) -> bool {
        !matches!(self, SourceKind::Env)
    }

    /// Detect the kind from a file name.
    ///
    /// Any name starting with `.env` (`.env`, `.env.local`, ...) is an env file;
    /// otherwise the extension decides. Returns `None` for unknown extensions.
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        let file_name = path.file_name()?.to_str()?;
        if file_name.starts_with(".env") {
            return Some(SourceKind::EnvFile);
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SourceKind::Json),
            "json5" => Some(SourceKind::Json5),
            "toml" => Some(SourceKind::Toml),
            "yaml" | "yml" => Some(SourceKind::Yaml),
            "ini" | "cfg" => Some(SourceKind::Ini),
            "env" => Some(SourceKind::EnvFile),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .or_else(|| (s == "yml").then_some(SourceKind::Yaml))
            .ok_or_else(|| format!("unknown source kind '{}'", s))
    }
}

/// An ordered sequence of field name segments.
///
/// Array indices are stored as stringified integers. The empty path denotes
/// the root of the tree and displays as `<root>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    /// Split a dotted string into segments. The empty string is the root path.
    pub fn from_dotted(dotted: &str) -> Self {
        if dotted.is_empty() {
            return FieldPath::root();
        }
        FieldPath(dotted.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The dotted form, with the root path rendering as an empty string.
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }

    pub fn child(&self, segment: impl Into<String>) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        FieldPath(segments)
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Prepend `prefix` segments, as used when a file source was narrowed to a sub-tree.
    pub fn with_prefix(&self, prefix: &FieldPath) -> FieldPath {
        let mut segments = prefix.0.clone();
        segments.extend(self.0.iter().cloned());
        FieldPath(segments)
    }

    pub fn into_segments(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

impl From<Vec<String>> for FieldPath {
    fn from(segments: Vec<String>) -> Self {
        FieldPath(segments)
    }
}

impl From<&[&str]> for FieldPath {
    fn from(segments: &[&str]) -> Self {
        FieldPath(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldPath {
    fn from(segments: [&str; N]) -> Self {
        FieldPath(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        FieldPath::from_dotted(dotted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_range_display() {
        assert_eq!(LineRange::single(4).to_string(), "line 4");
        assert_eq!(LineRange::new(2, 7).to_string(), "line 2-7");
    }

    #[test]
    fn test_line_range_end_never_before_start() {
        let range = LineRange::new(5, 3);
        assert_eq!(range.end, 5);
        assert!(range.is_single_line());
        assert_eq!(range.line_count(), 1);
    }

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("a/b.json")), Some(SourceKind::Json));
        assert_eq!(SourceKind::from_path(Path::new("b.JSON5")), Some(SourceKind::Json5));
        assert_eq!(SourceKind::from_path(Path::new("b.yml")), Some(SourceKind::Yaml));
        assert_eq!(SourceKind::from_path(Path::new("b.cfg")), Some(SourceKind::Ini));
        assert_eq!(SourceKind::from_path(Path::new(".env")), Some(SourceKind::EnvFile));
        assert_eq!(SourceKind::from_path(Path::new("conf/.env.local")), Some(SourceKind::EnvFile));
        assert_eq!(SourceKind::from_path(Path::new("prod.env")), Some(SourceKind::EnvFile));
        assert_eq!(SourceKind::from_path(Path::new("b.txt")), None);
        assert_eq!(SourceKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("envfile".parse::<SourceKind>(), Ok(SourceKind::EnvFile));
        assert_eq!("yml".parse::<SourceKind>(), Ok(SourceKind::Yaml));
        assert!("xml".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_field_path_display() {
        assert_eq!(FieldPath::root().to_string(), "<root>");
        assert_eq!(FieldPath::from_dotted("").dotted(), "");
        assert_eq!(FieldPath::from(["a", "0", "b"]).to_string(), "a.0.b");
    }

    #[test]
    fn test_field_path_prefix() {
        let path = FieldPath::from_dotted("port");
        let prefixed = path.with_prefix(&FieldPath::from_dotted("app.database"));
        assert_eq!(prefixed.segments(), &["app", "database", "port"]);
        assert!(prefixed.starts_with(&FieldPath::from_dotted("app")));
        assert!(!path.starts_with(&FieldPath::from_dotted("app")));
    }

    #[test]
    fn test_field_path_serializes_as_list() {
        let json = serde_json::to_string(&FieldPath::from_dotted("a.b")).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
    }
}
