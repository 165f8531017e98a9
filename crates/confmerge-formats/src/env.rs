//! Environment variables and env files.

use confmerge_config::ConfigValue;
use confmerge_source_map::SourceKind;

use crate::{FormatError, coerce_scalar};

/// How variable names map to tree paths.
///
/// A variable is taken when its name starts with `prefix`. The prefix is
/// stripped, the rest lower-cased and split on `split_symbols`, so with
/// prefix `APP_` the variable `APP_DB__HOST` becomes `db.host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvMapping {
    pub prefix: String,
    pub split_symbols: String,
}

impl Default for EnvMapping {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            split_symbols: "__".to_string(),
        }
    }
}

impl EnvMapping {
    pub fn new(prefix: impl Into<String>, split_symbols: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            split_symbols: split_symbols.into(),
        }
    }

    /// Tree path for a variable name, or `None` if the name is not selected.
    pub fn key_path(&self, name: &str) -> Option<Vec<String>> {
        let rest = name.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            return None;
        }
        let lowered = rest.to_lowercase();
        if self.split_symbols.is_empty() {
            return Some(vec![lowered]);
        }
        Some(
            lowered
                .split(self.split_symbols.as_str())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// Build a tree from `(name, value)` pairs; later pairs win.
pub fn from_env_vars<I, K, V>(vars: I, mapping: &EnvMapping) -> ConfigValue
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut root = ConfigValue::empty_map();
    for (name, value) in vars {
        let Some(path) = mapping.key_path(name.as_ref()) else {
            continue;
        };
        set_nested(&mut root, &path, coerce_scalar(value.as_ref()));
    }
    root
}

/// Read the process environment, in variable-name order.
pub fn from_process_env(mapping: &EnvMapping) -> ConfigValue {
    let mut vars: Vec<(String, String)> = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();
    vars.sort();
    let value = from_env_vars(vars, mapping);
    tracing::debug!(prefix = %mapping.prefix, "read process environment");
    value
}

/// Parse dotenv text. Quoting, `export` and `${VAR}` substitution follow `dotenvy`.
pub fn parse_env_file(text: &str, mapping: &EnvMapping) -> Result<ConfigValue, FormatError> {
    let vars = dotenvy::from_read_iter(text.as_bytes())
        .collect::<Result<Vec<(String, String)>, _>>()
        .map_err(|e| FormatError::parse(SourceKind::EnvFile, e))?;
    Ok(from_env_vars(vars, mapping))
}

fn set_nested(root: &mut ConfigValue, path: &[String], value: ConfigValue) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut target = root.force_map();
    for segment in parents {
        target = target
            .entry(segment.clone())
            .or_insert_with(ConfigValue::empty_map)
            .force_map();
    }
    target.insert(last.clone(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_path() {
        let mapping = EnvMapping::new("APP_", "__");
        assert_eq!(mapping.key_path("APP_DB__HOST"), Some(vec!["db".to_string(), "host".to_string()]));
        assert_eq!(mapping.key_path("APP_"), None);
        assert_eq!(mapping.key_path("OTHER_DB"), None);
    }

    #[test]
    fn test_from_env_vars() {
        let vars = [
            ("APP_DB__HOST", "localhost"),
            ("APP_DB__PORT", "5432"),
            ("APP_DEBUG", "true"),
            ("HOME", "/root"),
        ];
        let value = from_env_vars(vars, &EnvMapping::new("APP_", "__"));
        assert_eq!(
            value,
            ConfigValue::from(json!({"db": {"host": "localhost", "port": 5432}, "debug": true}))
        );
    }

    #[test]
    fn test_nested_key_replaces_scalar() {
        let value = from_env_vars([("A", "1"), ("A__B", "2")], &EnvMapping::default());
        assert_eq!(value, ConfigValue::from(json!({"a": {"b": 2}})));
    }

    #[test]
    fn test_env_file() {
        let text = "# comment\nexport APP_NAME=\"my app\"\nAPP_TAGS='[\"a\", \"b\"]'\nAPP_DB__PORT=5432\n";
        let value = parse_env_file(text, &EnvMapping::new("APP_", "__")).unwrap();
        assert_eq!(
            value,
            ConfigValue::from(json!({"name": "my app", "tags": ["a", "b"], "db": {"port": 5432}}))
        );
    }

    #[test]
    fn test_env_file_error() {
        let err = parse_env_file("BAD LINE\n", &EnvMapping::default()).unwrap_err();
        assert!(matches!(err, FormatError::Parse { kind: SourceKind::EnvFile, .. }));
    }
}
