//! Merge strategies, per-field rules and the merge error type.

use confmerge_source_map::FieldPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::conflict::ConflictRecord;
use crate::field_group::FieldGroupViolation;

/// Global strategy used wherever no per-field rule applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Later sources override earlier ones
    #[default]
    LastWins,
    /// The first source to set a value keeps it
    FirstWins,
    /// Like `LastWins`, but differing leaf values across sources are an error
    RaiseOnConflict,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::LastWins => "last_wins",
            MergeStrategy::FirstWins => "first_wins",
            MergeStrategy::RaiseOnConflict => "raise_on_conflict",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "last_wins" => Ok(MergeStrategy::LastWins),
            "first_wins" => Ok(MergeStrategy::FirstWins),
            "raise_on_conflict" => Ok(MergeStrategy::RaiseOnConflict),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Strategy applied at one specific field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMergeStrategy {
    FirstWins,
    LastWins,
    /// Concatenate base then override
    Append,
    /// Concatenate, then drop repeats keeping the first occurrence
    AppendUnique,
    /// Concatenate override then base
    Prepend,
    PrependUnique,
    /// The larger of two comparable scalars
    Max,
    /// The smaller of two comparable scalars
    Min,
}

impl FieldMergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldMergeStrategy::FirstWins => "first_wins",
            FieldMergeStrategy::LastWins => "last_wins",
            FieldMergeStrategy::Append => "append",
            FieldMergeStrategy::AppendUnique => "append_unique",
            FieldMergeStrategy::Prepend => "prepend",
            FieldMergeStrategy::PrependUnique => "prepend_unique",
            FieldMergeStrategy::Max => "max",
            FieldMergeStrategy::Min => "min",
        }
    }

    /// Upper-case name used in merge error messages.
    pub fn label(&self) -> &'static str {
        match self {
            FieldMergeStrategy::FirstWins => "FIRST_WINS",
            FieldMergeStrategy::LastWins => "LAST_WINS",
            FieldMergeStrategy::Append => "APPEND",
            FieldMergeStrategy::AppendUnique => "APPEND_UNIQUE",
            FieldMergeStrategy::Prepend => "PREPEND",
            FieldMergeStrategy::PrependUnique => "PREPEND_UNIQUE",
            FieldMergeStrategy::Max => "MAX",
            FieldMergeStrategy::Min => "MIN",
        }
    }

    /// Whether the strategy combines two lists.
    pub fn is_list_strategy(&self) -> bool {
        matches!(
            self,
            FieldMergeStrategy::Append
                | FieldMergeStrategy::AppendUnique
                | FieldMergeStrategy::Prepend
                | FieldMergeStrategy::PrependUnique
        )
    }
}

impl fmt::Display for FieldMergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldMergeStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let strategy = match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "first_wins" => FieldMergeStrategy::FirstWins,
            "last_wins" => FieldMergeStrategy::LastWins,
            "append" => FieldMergeStrategy::Append,
            "append_unique" => FieldMergeStrategy::AppendUnique,
            "prepend" => FieldMergeStrategy::Prepend,
            "prepend_unique" => FieldMergeStrategy::PrependUnique,
            "max" => FieldMergeStrategy::Max,
            "min" => FieldMergeStrategy::Min,
            _ => return Err(ConfigError::UnknownStrategy(s.to_string())),
        };
        Ok(strategy)
    }
}

/// A strategy bound to a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMergeRule {
    pub path: FieldPath,
    pub strategy: FieldMergeStrategy,
}

impl FieldMergeRule {
    pub fn new(path: impl Into<FieldPath>, strategy: FieldMergeStrategy) -> Self {
        Self {
            path: path.into(),
            strategy,
        }
    }
}

impl FromStr for FieldMergeRule {
    type Err = ConfigError;

    /// Parse `path=strategy`, e.g. `tags=append_unique`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, strategy) = s
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidRule(s.to_string()))?;
        let path = path.trim();
        if path.is_empty() {
            return Err(ConfigError::InvalidRule(s.to_string()));
        }
        Ok(FieldMergeRule::new(path, strategy.trim().parse()?))
    }
}

/// Per-field rules keyed by dotted path.
///
/// A later rule for the same path replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMergeRules {
    by_path: IndexMap<String, FieldMergeStrategy>,
}

impl FieldMergeRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule: FieldMergeRule) {
        self.by_path.insert(rule.path.dotted(), rule.strategy);
    }

    pub fn get(&self, dotted: &str) -> Option<FieldMergeStrategy> {
        self.by_path.get(dotted).copied()
    }

    pub fn contains(&self, dotted: &str) -> bool {
        self.by_path.contains_key(dotted)
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldMergeStrategy)> {
        self.by_path.iter().map(|(path, s)| (path.as_str(), *s))
    }
}

impl FromIterator<FieldMergeRule> for FieldMergeRules {
    fn from_iter<T: IntoIterator<Item = FieldMergeRule>>(iter: T) -> Self {
        let mut rules = FieldMergeRules::new();
        for rule in iter {
            rules.insert(rule);
        }
        rules
    }
}

/// A field rule met values it cannot combine.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct MergeTypeError {
    pub path: FieldPath,
    pub source_index: usize,
    pub message: String,
}

/// Errors produced while merging configuration trees.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Per-field strategies were applied to values they cannot combine
    #[error("{}", render_type_errors(.0))]
    MergeTypes(Vec<MergeTypeError>),

    /// Leaf values differ across sources under `RaiseOnConflict`
    #[error("{} conflicting field(s) across sources", count(.0))]
    Conflicts(Vec<ConflictRecord>),

    /// Sources partially overrode one or more field groups
    #[error("{} field group violation(s)", count(.0))]
    FieldGroups(Vec<FieldGroupViolation>),

    #[error("Unknown merge strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid field rule '{0}', expected PATH=STRATEGY")]
    InvalidRule(String),
}

fn count<T>(items: &[T]) -> usize {
    items.len()
}

fn render_type_errors(errors: &[MergeTypeError]) -> String {
    errors
        .iter()
        .map(|error| format!("[{}] {}", error.path, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}
