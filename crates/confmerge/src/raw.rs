//! A loaded source together with what diagnostics need to find lines in it.

use confmerge_config::ConfigValue;
use confmerge_formats::{EnvMapping, from_process_env, parse, select_prefix};
use confmerge_locate::{SourceContext, resolve_source_location};
use confmerge_source_map::{FieldPath, SourceKind, SourceLocation};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::source::{Source, SourceError, SourceOrigin};

/// A successfully loaded source.
///
/// File text is not kept after parsing; it is read again only when a
/// diagnostic needs an excerpt.
#[derive(Debug, Clone)]
pub struct RawSource {
    /// Position in the configured source list
    pub index: usize,
    pub kind: SourceKind,
    pub file: Option<PathBuf>,
    /// Inline text, kept since it cannot be read again
    text: Option<String>,
    prefix: Option<String>,
    split_symbols: String,
    /// Top-level keys of the loaded tree
    pub keys: Vec<String>,
}

impl RawSource {
    /// Read and parse `source`, narrowing it to its prefix.
    pub fn load(index: usize, source: &Source) -> Result<(RawSource, ConfigValue), SourceError> {
        let kind = source.resolved_kind()?;
        let mapping = EnvMapping::new(
            source.prefix.clone().unwrap_or_default(),
            source.split_symbols.clone(),
        );

        let (tree, text) = match &source.origin {
            SourceOrigin::Env => (from_process_env(&mapping), None),
            SourceOrigin::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| SourceError::Read {
                    path: path.clone(),
                    source: e,
                })?;
                (parse(kind, &text, &mapping)?, None)
            }
            SourceOrigin::Inline { text, .. } => (parse(kind, text, &mapping)?, Some(text.clone())),
        };

        let tree = match (&source.prefix, kind) {
            (Some(prefix), kind) if kind != SourceKind::Env && kind != SourceKind::EnvFile => {
                select_prefix(tree, &FieldPath::from_dotted(prefix))
            }
            _ => tree,
        };

        let keys = tree
            .as_map()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();

        let raw = RawSource {
            index,
            kind,
            file: source.display_path().map(Path::to_path_buf),
            text,
            prefix: source.prefix.clone(),
            split_symbols: source.split_symbols.clone(),
            keys,
        };
        Ok((raw, tree))
    }

    /// How this source is named in field group reports.
    pub fn repr(&self) -> String {
        confmerge_error_reporting::source_repr(self.kind, self.file.as_deref())
    }

    /// Text for excerpts: inline text, or the file read again.
    ///
    /// A file that can no longer be read yields `None`.
    fn diagnostic_text(&self) -> Option<Cow<'_, str>> {
        if let Some(text) = &self.text {
            return Some(Cow::Borrowed(text));
        }
        if !self.kind.has_text() {
            return None;
        }
        let path = self.file.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(text) => Some(Cow::Owned(text)),
            Err(err) => {
                tracing::debug!(file = %path.display(), error = %err, "source text unavailable for diagnostics");
                None
            }
        }
    }

    /// Where the value at `path` was defined in this source.
    pub fn locate(&self, path: &FieldPath) -> Option<SourceLocation> {
        let text = self.diagnostic_text();
        let mut ctx = SourceContext::new(self.kind)
            .with_text(text.as_deref())
            .with_prefix(self.prefix.as_deref())
            .with_split_symbols(&self.split_symbols);
        if let Some(file) = &self.file {
            ctx = ctx.with_file(file);
        }
        resolve_source_location(path, &ctx)
    }
}
