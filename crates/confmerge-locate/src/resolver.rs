//! Turn a field path plus a source's identity into a [`SourceLocation`].

use crate::PathFinder;
use crate::envfile::find_env_var;
use confmerge_source_map::{FieldPath, SourceKind, SourceLocation, excerpt};
use std::path::Path;

/// Default separator between nested segments in environment variable names.
pub const DEFAULT_SPLIT_SYMBOLS: &str = "__";

/// Everything the resolver needs to know about one source.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    pub kind: SourceKind,
    /// File (or display) path; `None` for the process environment
    pub file_path: Option<&'a Path>,
    /// Raw text, when available
    pub text: Option<&'a str>,
    /// Dotted sub-tree for file sources, literal name prefix for env sources
    pub prefix: Option<&'a str>,
    pub split_symbols: &'a str,
}

impl<'a> SourceContext<'a> {
    pub fn new(kind: SourceKind) -> Self {
        SourceContext {
            kind,
            file_path: None,
            text: None,
            prefix: None,
            split_symbols: DEFAULT_SPLIT_SYMBOLS,
        }
    }

    pub fn with_file(mut self, path: &'a Path) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn with_text(mut self, text: Option<&'a str>) -> Self {
        self.text = text;
        self
    }

    pub fn with_prefix(mut self, prefix: Option<&'a str>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_split_symbols(mut self, split_symbols: &'a str) -> Self {
        self.split_symbols = split_symbols;
        self
    }
}

/// Build the environment variable name for `path`.
///
/// Segments are upper-cased and joined with `split_symbols`; the prefix is
/// prepended verbatim.
///
/// # Example
///
/// ```rust
/// use confmerge_locate::env_var_name;
/// use confmerge_source_map::FieldPath;
///
/// let path = FieldPath::from_dotted("database.port");
/// assert_eq!(env_var_name(&path, Some("APP_"), "__"), "APP_DATABASE__PORT");
/// ```
pub fn env_var_name(path: &FieldPath, prefix: Option<&str>, split_symbols: &str) -> String {
    let joined = path
        .segments()
        .iter()
        .map(|segment| segment.to_uppercase())
        .collect::<Vec<_>>()
        .join(split_symbols);
    match prefix {
        Some(prefix) => format!("{}{}", prefix, joined),
        None => joined,
    }
}

/// The path to look for in a file narrowed to `prefix` (`"app.database"`).
pub fn search_path(path: &FieldPath, prefix: Option<&str>) -> FieldPath {
    match prefix {
        Some(prefix) if !prefix.is_empty() => path.with_prefix(&FieldPath::from_dotted(prefix)),
        _ => path.clone(),
    }
}

/// Resolve where the value at `path` was defined in the source described by `ctx`.
///
/// Environment sources always produce a name-only location. File sources
/// produce a file location whose range is absent when the scanner cannot
/// find the path. Returns `None` only for a file kind with no file path.
pub fn resolve_source_location(path: &FieldPath, ctx: &SourceContext<'_>) -> Option<SourceLocation> {
    match ctx.kind {
        SourceKind::Env => Some(SourceLocation::Env {
            var_name: env_var_name(path, ctx.prefix, ctx.split_symbols),
        }),
        SourceKind::EnvFile => {
            let var_name = env_var_name(path, ctx.prefix, ctx.split_symbols);
            let range = ctx.text.and_then(|text| find_env_var(text, &var_name));
            let lines = ctx.text.zip(range).map(|(text, range)| excerpt(text, range));
            Some(SourceLocation::EnvFile {
                path: ctx.file_path?.to_path_buf(),
                var_name,
                range,
                lines,
            })
        }
        kind => {
            let file_path = ctx.file_path?;
            let range = match (ctx.text, PathFinder::for_kind(kind)) {
                (Some(text), Some(finder)) if !path.is_root() => {
                    let target = search_path(path, ctx.prefix);
                    let found = finder.find_line_range(text, target.segments());
                    if found.is_none() {
                        tracing::debug!(
                            path = %path,
                            file = %file_path.display(),
                            kind = kind.as_str(),
                            "field path not found in source text"
                        );
                    }
                    found
                }
                _ => None,
            };
            let lines = ctx.text.zip(range).map(|(text, range)| excerpt(text, range));
            Some(SourceLocation::File {
                kind,
                path: file_path.to_path_buf(),
                range,
                lines,
            })
        }
    }
}
