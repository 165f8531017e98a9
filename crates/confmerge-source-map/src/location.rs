//! Resolved source locations

use crate::types::{LineRange, SourceKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a field's value came from.
///
/// A file location without a range means the scanner could not find the
/// field; the file itself is still reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceLocation {
    File {
        kind: SourceKind,
        path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        range: Option<LineRange>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lines: Option<Vec<String>>,
    },
    Env {
        var_name: String,
    },
    EnvFile {
        path: PathBuf,
        var_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        range: Option<LineRange>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lines: Option<Vec<String>>,
    },
}

impl SourceLocation {
    /// A file-level attribution with no line information.
    pub fn file_only(kind: SourceKind, path: impl Into<PathBuf>) -> Self {
        SourceLocation::File {
            kind,
            path: path.into(),
            range: None,
            lines: None,
        }
    }

    pub fn env(var_name: impl Into<String>) -> Self {
        SourceLocation::Env {
            var_name: var_name.into(),
        }
    }

    pub fn range(&self) -> Option<LineRange> {
        match self {
            SourceLocation::File { range, .. } | SourceLocation::EnvFile { range, .. } => *range,
            SourceLocation::Env { .. } => None,
        }
    }

    pub fn lines(&self) -> Option<&[String]> {
        match self {
            SourceLocation::File { lines, .. } | SourceLocation::EnvFile { lines, .. } => {
                lines.as_deref()
            }
            SourceLocation::Env { .. } => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceLocation::File { path, .. } | SourceLocation::EnvFile { path, .. } => Some(path),
            SourceLocation::Env { .. } => None,
        }
    }

    pub fn var_name(&self) -> Option<&str> {
        match self {
            SourceLocation::Env { var_name } | SourceLocation::EnvFile { var_name, .. } => {
                Some(var_name)
            }
            SourceLocation::File { .. } => None,
        }
    }
}
