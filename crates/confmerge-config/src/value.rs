//! The format-agnostic configuration tree.

use confmerge_source_map::FieldPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A parsed configuration value.
///
/// Every source format is converted into this tree before merging. Map
/// entries keep their source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<ConfigValue>),
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    /// An empty map, the starting point of every merge.
    pub fn empty_map() -> Self {
        ConfigValue::Map(IndexMap::new())
    }

    /// The type name used in merge error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Integer(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "str",
            ConfigValue::Array(_) => "list",
            ConfigValue::Map(_) => "dict",
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, ConfigValue::Map(_))
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The entries of this map, first replacing a non-map value with an empty map.
    pub fn force_map(&mut self) -> &mut IndexMap<String, ConfigValue> {
        if !self.is_map() {
            *self = ConfigValue::empty_map();
        }
        match self {
            ConfigValue::Map(entries) => entries,
            _ => unreachable!("value was just replaced by a map"),
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Walk `path` through nested maps. Array segments are parsed as indices.
    pub fn get(&self, path: &FieldPath) -> Option<&ConfigValue> {
        path.segments()
            .iter()
            .try_fold(self, |current, segment| match current {
                ConfigValue::Map(entries) => entries.get(segment),
                ConfigValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Walk `path` through nested maps only.
    pub fn get_in_maps(&self, path: &FieldPath) -> Option<&ConfigValue> {
        path.segments()
            .iter()
            .try_fold(self, |current, segment| current.as_map()?.get(segment))
    }

    /// Paths of every leaf under this value.
    ///
    /// Non-empty maps are descended into; everything else (scalars, lists,
    /// empty maps) is a leaf. A leaf value at the root yields the root path.
    pub fn leaf_paths(&self) -> Vec<FieldPath> {
        let mut out = Vec::new();
        collect_leaves(self, FieldPath::root(), &mut out);
        out
    }

    /// Order two comparable scalars (numbers with numbers, strings with strings).
    pub fn compare(&self, other: &ConfigValue) -> Option<Ordering> {
        match (self, other) {
            (ConfigValue::Integer(a), ConfigValue::Integer(b)) => Some(a.cmp(b)),
            (ConfigValue::String(a), ConfigValue::String(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Integer(i) => Some(*i as f64),
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`; non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Integer(i) => serde_json::Value::from(*i),
            ConfigValue::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn collect_leaves(value: &ConfigValue, path: FieldPath, out: &mut Vec<FieldPath>) {
    match value {
        ConfigValue::Map(entries) if !entries.is_empty() => {
            for (key, child) in entries {
                collect_leaves(child, path.child(key.clone()), out);
            }
        }
        _ => out.push(path),
    }
}

/// Structural equality; integers and floats compare numerically.
impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigValue::Null, ConfigValue::Null) => true,
            (ConfigValue::Bool(a), ConfigValue::Bool(b)) => a == b,
            (ConfigValue::Integer(a), ConfigValue::Integer(b)) => a == b,
            (ConfigValue::Float(a), ConfigValue::Float(b)) => a == b,
            (ConfigValue::Integer(i), ConfigValue::Float(f))
            | (ConfigValue::Float(f), ConfigValue::Integer(i)) => (*i as f64) == *f,
            (ConfigValue::String(a), ConfigValue::String(b)) => a == b,
            (ConfigValue::Array(a), ConfigValue::Array(b)) => a == b,
            (ConfigValue::Map(a), ConfigValue::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            _ => false,
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(entries) => ConfigValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}
