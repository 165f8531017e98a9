//! Source declarations.

use confmerge_formats::FormatError;
use confmerge_locate::DEFAULT_SPLIT_SYMBOLS;
use confmerge_source_map::{SourceKind, SourceLocation};
use std::path::{Path, PathBuf};

/// Where a source's data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    File(PathBuf),
    /// The process environment
    Env,
    /// Text supplied by the caller; `name` stands in for a file name in diagnostics
    Inline { name: String, text: String },
}

/// One configuration source, declared builder style.
///
/// ```rust
/// use confmerge::Source;
///
/// let defaults = Source::file("defaults.toml");
/// let local = Source::file("local.yaml").prefix("app").skip_if_broken(true);
/// let env = Source::env().prefix("APP_");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub(crate) origin: SourceOrigin,
    pub(crate) kind: Option<SourceKind>,
    pub(crate) prefix: Option<String>,
    pub(crate) split_symbols: String,
    pub(crate) skip_if_broken: Option<bool>,
}

impl Source {
    fn with_origin(origin: SourceOrigin, kind: Option<SourceKind>) -> Self {
        Self {
            origin,
            kind,
            prefix: None,
            split_symbols: DEFAULT_SPLIT_SYMBOLS.to_string(),
            skip_if_broken: None,
        }
    }

    /// A file whose format is detected from its name unless set with [`Source::kind`].
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_origin(SourceOrigin::File(path.into()), None)
    }

    pub fn env() -> Self {
        Self::with_origin(SourceOrigin::Env, Some(SourceKind::Env))
    }

    pub fn inline(kind: SourceKind, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_origin(
            SourceOrigin::Inline {
                name: name.into(),
                text: text.into(),
            },
            Some(kind),
        )
    }

    pub fn kind(mut self, kind: SourceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// For file formats, the dotted sub-tree to load (`"app.database"`).
    /// For environment sources, the variable name prefix (`"APP_"`).
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Separator between nesting levels in environment variable names.
    pub fn split_symbols(mut self, split_symbols: impl Into<String>) -> Self {
        self.split_symbols = split_symbols.into();
        self
    }

    /// Skip this source with a warning instead of failing when it cannot be loaded.
    pub fn skip_if_broken(mut self, skip: bool) -> Self {
        self.skip_if_broken = Some(skip);
        self
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    /// The explicit kind, or the one detected from the file name.
    pub fn resolved_kind(&self) -> Result<SourceKind, SourceError> {
        if let Some(kind) = self.kind {
            return Ok(kind);
        }
        match &self.origin {
            SourceOrigin::File(path) => {
                SourceKind::from_path(path).ok_or_else(|| SourceError::UnknownFormat {
                    path: path.clone(),
                })
            }
            SourceOrigin::Env => Ok(SourceKind::Env),
            SourceOrigin::Inline { name, .. } => Err(SourceError::UnknownFormat {
                path: PathBuf::from(name),
            }),
        }
    }

    /// The path shown in diagnostics; `None` for the process environment.
    pub fn display_path(&self) -> Option<&Path> {
        match &self.origin {
            SourceOrigin::File(path) => Some(path),
            SourceOrigin::Inline { name, .. } => Some(Path::new(name)),
            SourceOrigin::Env => None,
        }
    }

    /// Short description used in log lines.
    pub fn describe(&self) -> String {
        match self.display_path() {
            Some(path) => path.display().to_string(),
            None => "<environment>".to_string(),
        }
    }

    /// File-level location for errors about the source as a whole.
    pub(crate) fn file_location(&self) -> Option<SourceLocation> {
        let kind = self.resolved_kind().ok()?;
        Some(SourceLocation::file_only(kind, self.display_path()?))
    }
}

/// A source that could not be turned into a tree.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(
        "Cannot detect the format of '{}'; supported extensions: .json, .json5, .toml, .yaml, .yml, .ini, .cfg, .env",
        path.display()
    )]
    UnknownFormat { path: PathBuf },

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}
