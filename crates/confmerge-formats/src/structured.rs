//! JSON, JSON5, TOML and YAML.

use confmerge_config::ConfigValue;
use confmerge_source_map::SourceKind;
use indexmap::IndexMap;
use yaml_rust2::{Yaml, YamlLoader};

use crate::FormatError;

pub fn parse_json(text: &str) -> Result<ConfigValue, FormatError> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(ConfigValue::from)
        .map_err(|e| FormatError::parse(SourceKind::Json, e))
}

pub fn parse_json5(text: &str) -> Result<ConfigValue, FormatError> {
    json5::from_str::<serde_json::Value>(text)
        .map(ConfigValue::from)
        .map_err(|e| FormatError::parse(SourceKind::Json5, e))
}

pub fn parse_toml(text: &str) -> Result<ConfigValue, FormatError> {
    let table = text
        .parse::<toml::Table>()
        .map_err(|e| FormatError::parse(SourceKind::Toml, e.message()))?;
    Ok(from_toml(toml::Value::Table(table)))
}

/// Datetimes are kept in their TOML text form.
fn from_toml(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::Integer(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        toml::Value::Array(items) => ConfigValue::Array(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(entries) => ConfigValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k, from_toml(v)))
                .collect(),
        ),
    }
}

/// Only the first document of a multi-document stream is used; an empty
/// stream is an empty map.
pub fn parse_yaml(text: &str) -> Result<ConfigValue, FormatError> {
    let docs = YamlLoader::load_from_str(text).map_err(|e| FormatError::parse(SourceKind::Yaml, e))?;
    match docs.into_iter().next() {
        Some(doc) => from_yaml(doc),
        None => Ok(ConfigValue::empty_map()),
    }
}

fn from_yaml(yaml: Yaml) -> Result<ConfigValue, FormatError> {
    let value = match yaml {
        Yaml::Null | Yaml::BadValue | Yaml::Alias(_) => ConfigValue::Null,
        Yaml::Boolean(b) => ConfigValue::Bool(b),
        Yaml::Integer(i) => ConfigValue::Integer(i),
        Yaml::Real(s) => ConfigValue::Float(yaml_float(&s)),
        Yaml::String(s) => ConfigValue::String(s),
        Yaml::Array(items) => ConfigValue::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Hash(hash) => {
            let mut entries = IndexMap::with_capacity(hash.len());
            for (key, value) in hash {
                entries.insert(yaml_key(key)?, from_yaml(value)?);
            }
            ConfigValue::Map(entries)
        }
    };
    Ok(value)
}

fn yaml_float(s: &str) -> f64 {
    match s.trim_start_matches('+') {
        ".inf" | ".Inf" | ".INF" => f64::INFINITY,
        "-.inf" | "-.Inf" | "-.INF" => f64::NEG_INFINITY,
        ".nan" | ".NaN" | ".NAN" => f64::NAN,
        other => other.parse().unwrap_or(f64::NAN),
    }
}

fn yaml_key(key: Yaml) -> Result<String, FormatError> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Ok(s),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(FormatError::parse(
            SourceKind::Yaml,
            format!("unsupported mapping key {other:?}"),
        )),
    }
}
