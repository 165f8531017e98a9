//! Error records and the aggregate load error.

use confmerge_source_map::{FieldPath, SourceLocation};
use serde::Serialize;
use std::fmt;

use crate::location::format_location;

/// A problem with one field (or the whole source at `<root>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldLoadError {
    pub path: FieldPath,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl FieldLoadError {
    pub fn new(path: impl Into<FieldPath>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    fn lines(&self) -> Vec<String> {
        let mut out = vec![headline(&self.path, &self.message)];
        if let Some(location) = &self.location {
            out.extend(format_location(location));
        }
        out
    }
}

/// A field set to different values by several sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeConflictFieldError {
    pub path: FieldPath,
    pub message: String,
    /// One location per conflicting source, in source order
    pub locations: Vec<SourceLocation>,
}

impl MergeConflictFieldError {
    fn lines(&self) -> Vec<String> {
        let mut out = vec![headline(&self.path, &self.message)];
        for location in &self.locations {
            out.extend(format_location(location));
        }
        out
    }
}

/// A source that changed only part of a field group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroupViolationError {
    pub group: Vec<FieldPath>,
    pub source_index: usize,
    /// Changed fields with the source they came from
    pub changed: Vec<(FieldPath, String)>,
    /// Untouched fields with the source that last set them, or `none`
    pub unchanged: Vec<(FieldPath, String)>,
}

impl FieldGroupViolationError {
    fn lines(&self) -> Vec<String> {
        let group = self
            .group
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        vec![
            format!(
                "  Field group ({group}) partially overridden in source {}",
                self.source_index
            ),
            format!("    changed:   {}", attributed(&self.changed)),
            format!("    unchanged: {}", attributed(&self.unchanged)),
        ]
    }
}

fn attributed(fields: &[(FieldPath, String)]) -> String {
    fields
        .iter()
        .map(|(path, source)| format!("{path} (from source {source})"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn headline(path: &FieldPath, message: &str) -> String {
    format!("  [{path}]  {message}")
}

impl fmt::Display for FieldLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

impl fmt::Display for MergeConflictFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

impl fmt::Display for FieldGroupViolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// The fatal outcome of a configuration load.
///
/// `name` is the name of the configuration being loaded and heads the
/// report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigLoadError {
    #[error("{}", render_loading(.name, .errors))]
    Loading {
        name: String,
        errors: Vec<FieldLoadError>,
    },

    #[error("{}", render_conflicts(.name, .conflicts))]
    MergeConflict {
        name: String,
        conflicts: Vec<MergeConflictFieldError>,
    },

    #[error("{}", render_violations(.name, .violations))]
    FieldGroup {
        name: String,
        violations: Vec<FieldGroupViolationError>,
    },
}

impl ConfigLoadError {
    pub fn name(&self) -> &str {
        match self {
            ConfigLoadError::Loading { name, .. }
            | ConfigLoadError::MergeConflict { name, .. }
            | ConfigLoadError::FieldGroup { name, .. } => name,
        }
    }

    /// Number of individual problems reported.
    pub fn len(&self) -> usize {
        match self {
            ConfigLoadError::Loading { errors, .. } => errors.len(),
            ConfigLoadError::MergeConflict { conflicts, .. } => conflicts.len(),
            ConfigLoadError::FieldGroup { violations, .. } => violations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn render_loading(name: &str, errors: &[FieldLoadError]) -> String {
    render(name, "loading errors", errors.iter().map(FieldLoadError::lines))
}

fn render_conflicts(name: &str, conflicts: &[MergeConflictFieldError]) -> String {
    render(name, "merge conflicts", conflicts.iter().map(MergeConflictFieldError::lines))
}

fn render_violations(name: &str, violations: &[FieldGroupViolationError]) -> String {
    render(
        name,
        "field group errors",
        violations.iter().map(FieldGroupViolationError::lines),
    )
}

/// Header, blank line, then each block followed by a blank line.
fn render(name: &str, title: &str, blocks: impl ExactSizeIterator<Item = Vec<String>>) -> String {
    let mut lines = vec![format!("{name} {title} ({})", blocks.len()), String::new()];
    for block in blocks {
        lines.extend(block);
        lines.push(String::new());
    }
    lines.join("\n")
}
