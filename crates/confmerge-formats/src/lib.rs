//! Deserializers turning raw source text into [`ConfigValue`] trees.
//!
//! Every format is handled by a dedicated crate where one exists in the
//! stack (`serde_json`, `json5`, `toml`, `yaml-rust2`, `dotenvy`); INI is
//! parsed here with configparser rules. Environment variables and env files
//! share the key mapping in [`EnvMapping`].

mod env;
mod ini;
mod structured;

use confmerge_config::ConfigValue;
use confmerge_source_map::{FieldPath, SourceKind};

pub use env::{EnvMapping, from_env_vars, from_process_env, parse_env_file};
pub use ini::parse_ini;
pub use structured::{parse_json, parse_json5, parse_toml, parse_yaml};

/// A source whose text could not be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Failed to parse {kind}: {message}")]
    Parse { kind: SourceKind, message: String },

    #[error("{kind} sources are not read from text")]
    NotText { kind: SourceKind },
}

impl FormatError {
    pub(crate) fn parse(kind: SourceKind, message: impl ToString) -> Self {
        FormatError::Parse {
            kind,
            message: message.to_string(),
        }
    }
}

/// Parse `text` as a source of the given kind.
///
/// `mapping` only applies to env files.
pub fn parse(kind: SourceKind, text: &str, mapping: &EnvMapping) -> Result<ConfigValue, FormatError> {
    let value = match kind {
        SourceKind::Json => parse_json(text)?,
        SourceKind::Json5 => parse_json5(text)?,
        SourceKind::Toml => parse_toml(text)?,
        SourceKind::Yaml => parse_yaml(text)?,
        SourceKind::Ini => parse_ini(text)?,
        SourceKind::EnvFile => parse_env_file(text, mapping)?,
        SourceKind::Env => return Err(FormatError::NotText { kind }),
    };
    tracing::trace!(%kind, "parsed source text");
    Ok(value)
}

/// Narrow `value` to the sub-tree at `prefix`.
///
/// A prefix that does not resolve to a value yields an empty map.
pub fn select_prefix(value: ConfigValue, prefix: &FieldPath) -> ConfigValue {
    let mut current = value;
    for segment in prefix.segments() {
        current = match current {
            ConfigValue::Map(mut entries) => match entries.shift_remove(segment) {
                Some(child) => child,
                None => return ConfigValue::empty_map(),
            },
            _ => return ConfigValue::empty_map(),
        };
    }
    current
}

/// Interpret an untyped string from an env or INI source.
///
/// Integers, floats, `true`/`false` and JSON lists or objects are
/// converted; everything else stays a string.
pub fn coerce_scalar(raw: &str) -> ConfigValue {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return ConfigValue::Integer(i);
    }
    if looks_numeric(trimmed) {
        if let Ok(f) = trimmed.parse::<f64>() {
            return ConfigValue::Float(f);
        }
    }
    match trimmed {
        "true" => return ConfigValue::Bool(true),
        "false" => return ConfigValue::Bool(false),
        _ => {}
    }
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return ConfigValue::from(json);
        }
    }
    ConfigValue::String(raw.to_string())
}

// Rejects words such as `inf` or `NaN` that f64 parsing would accept.
fn looks_numeric(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && digits.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_scalar() {
        assert_eq!(coerce_scalar("8080"), ConfigValue::Integer(8080));
        assert_eq!(coerce_scalar("-1.5"), ConfigValue::Float(-1.5));
        assert_eq!(coerce_scalar("true"), ConfigValue::Bool(true));
        assert_eq!(coerce_scalar("True"), ConfigValue::from("True"));
        assert_eq!(coerce_scalar("inf"), ConfigValue::from("inf"));
        assert_eq!(coerce_scalar("[1, \"a\"]"), ConfigValue::from(json!([1, "a"])));
        assert_eq!(coerce_scalar("[not json"), ConfigValue::from("[not json"));
        assert_eq!(coerce_scalar("localhost"), ConfigValue::from("localhost"));
    }

    #[test]
    fn test_select_prefix() {
        let tree = ConfigValue::from(json!({"app": {"db": {"host": "h"}}, "other": 1}));
        assert_eq!(
            select_prefix(tree.clone(), &FieldPath::from("app.db")),
            ConfigValue::from(json!({"host": "h"}))
        );
        assert_eq!(select_prefix(tree.clone(), &FieldPath::from("app.missing")), ConfigValue::empty_map());
        assert_eq!(select_prefix(tree.clone(), &FieldPath::from("other.x")), ConfigValue::empty_map());
        assert_eq!(select_prefix(tree.clone(), &FieldPath::root()), tree);
    }

    #[test]
    fn test_parse_dispatch() {
        let mapping = EnvMapping::default();
        assert_eq!(
            parse(SourceKind::Json, r#"{"a": 1}"#, &mapping).unwrap(),
            ConfigValue::from(json!({"a": 1}))
        );
        assert_eq!(
            parse(SourceKind::Env, "", &mapping).unwrap_err(),
            FormatError::NotText { kind: SourceKind::Env }
        );
    }
}
