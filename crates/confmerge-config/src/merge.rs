//! Deep merge of configuration trees.
//!
//! Sources are folded left to right into an accumulator that starts as an
//! empty map. Maps merge key by key; every other pairing is settled by the
//! global [`MergeStrategy`], unless a [`FieldMergeStrategy`] rule is
//! registered for the current path. A rule only fires when both sides hold a
//! value at its path, and it owns the whole subtree: nothing below a ruled
//! path is merged recursively. A rule that cannot combine its values keeps the
//! earlier value and records a [`MergeTypeError`]; the fold carries on so every
//! such error surfaces at once.

use confmerge_source_map::FieldPath;

use crate::report::MergeReport;
use crate::types::{ConfigError, FieldMergeRules, FieldMergeStrategy, MergeStrategy, MergeTypeError};
use crate::value::ConfigValue;

/// Stateful fold over a sequence of sources.
///
/// The merger keeps the provenance of every leaf it writes so callers can
/// attribute errors in the final tree back to a source.
pub struct Merger<'a> {
    strategy: MergeStrategy,
    rules: &'a FieldMergeRules,
    report: MergeReport,
    errors: Vec<MergeTypeError>,
}

impl<'a> Merger<'a> {
    pub fn new(strategy: MergeStrategy, rules: &'a FieldMergeRules) -> Self {
        Self {
            strategy,
            rules,
            report: MergeReport::new(strategy),
            errors: Vec::new(),
        }
    }

    /// Merge `source` (at position `index` in the source list) into `acc`.
    pub fn merge_source(&mut self, acc: ConfigValue, source: &ConfigValue, index: usize) -> ConfigValue {
        let mut path = Vec::new();
        self.merge_at(acc, source, &mut path, index)
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    /// Rule type errors recorded so far, in merge order.
    pub fn errors(&self) -> &[MergeTypeError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<MergeTypeError> {
        std::mem::take(&mut self.errors)
    }

    pub fn into_report(self) -> MergeReport {
        self.report
    }

    fn merge_at(
        &mut self,
        base: ConfigValue,
        over: &ConfigValue,
        path: &mut Vec<String>,
        index: usize,
    ) -> ConfigValue {
        let dotted = path.join(".");

        if let Some(rule) = self.rules.get(&dotted) {
            return match apply_field_merge(&base, over, rule) {
                Ok(merged) => {
                    self.record_rule(&dotted, rule, &base, over, &merged, index);
                    merged
                }
                Err(message) => {
                    tracing::debug!(path = %dotted, source = index, "field rule type error");
                    self.errors.push(MergeTypeError {
                        path: FieldPath::from(path.clone()),
                        source_index: index,
                        message,
                    });
                    base
                }
            };
        }

        match (base, over) {
            (ConfigValue::Map(mut entries), ConfigValue::Map(overrides)) => {
                if entries.is_empty() && !overrides.is_empty() {
                    // The empty map was recorded as a leaf; its new keys replace it.
                    self.report.forget(&dotted);
                }
                for (key, value) in overrides {
                    path.push(key.clone());
                    match entries.get_mut(key) {
                        Some(slot) => {
                            let current = std::mem::take(slot);
                            *slot = self.merge_at(current, value, path, index);
                        }
                        None => {
                            self.report.record_subtree(&path.join("."), value, index);
                            entries.insert(key.clone(), value.clone());
                        }
                    }
                    path.pop();
                }
                ConfigValue::Map(entries)
            }
            (base, over) => match self.strategy {
                MergeStrategy::FirstWins => base,
                MergeStrategy::LastWins | MergeStrategy::RaiseOnConflict => {
                    self.report.replace_subtree(&dotted, &base, over, index);
                    over.clone()
                }
            },
        }
    }

    fn record_rule(
        &mut self,
        dotted: &str,
        rule: FieldMergeStrategy,
        base: &ConfigValue,
        over: &ConfigValue,
        merged: &ConfigValue,
        index: usize,
    ) {
        match rule {
            FieldMergeStrategy::FirstWins => {}
            FieldMergeStrategy::LastWins => self.report.replace_subtree(dotted, base, over, index),
            FieldMergeStrategy::Append
            | FieldMergeStrategy::AppendUnique
            | FieldMergeStrategy::Prepend
            | FieldMergeStrategy::PrependUnique => self.report.add_contributor(dotted, index),
            FieldMergeStrategy::Max | FieldMergeStrategy::Min => {
                if merged != base {
                    self.report.replace_subtree(dotted, base, over, index);
                }
            }
        }
    }
}

/// Merge every tree in order with the given strategy and rules.
///
/// `RaiseOnConflict` merges like `LastWins` here; conflict detection is a
/// separate pass, see [`crate::detect_conflicts`]. Fails with every rule type
/// error met across all trees.
pub fn deep_merge(
    trees: &[ConfigValue],
    strategy: MergeStrategy,
    rules: &FieldMergeRules,
) -> Result<ConfigValue, ConfigError> {
    let mut merger = Merger::new(strategy, rules);
    let merged = trees
        .iter()
        .enumerate()
        .fold(ConfigValue::empty_map(), |acc, (index, tree)| {
            merger.merge_source(acc, tree, index)
        });
    let errors = merger.take_errors();
    if errors.is_empty() {
        Ok(merged)
    } else {
        Err(ConfigError::MergeTypes(errors))
    }
}

/// Combine two values present at a ruled path.
///
/// Returns the error message (without path) when the values cannot be
/// combined by `strategy`.
pub fn apply_field_merge(
    base: &ConfigValue,
    over: &ConfigValue,
    strategy: FieldMergeStrategy,
) -> Result<ConfigValue, String> {
    match strategy {
        FieldMergeStrategy::FirstWins => Ok(base.clone()),
        FieldMergeStrategy::LastWins => Ok(over.clone()),
        FieldMergeStrategy::Append
        | FieldMergeStrategy::AppendUnique
        | FieldMergeStrategy::Prepend
        | FieldMergeStrategy::PrependUnique => {
            let (ConfigValue::Array(first), ConfigValue::Array(second)) = (base, over) else {
                return Err(format!(
                    "{} strategy requires both values to be lists, got {} and {}",
                    strategy.label(),
                    base.type_name(),
                    over.type_name()
                ));
            };
            let (head, tail) = match strategy {
                FieldMergeStrategy::Prepend | FieldMergeStrategy::PrependUnique => (second, first),
                _ => (first, second),
            };
            let combined = head.iter().chain(tail.iter()).cloned();
            let items = match strategy {
                FieldMergeStrategy::AppendUnique | FieldMergeStrategy::PrependUnique => {
                    dedup(combined)
                }
                _ => combined.collect(),
            };
            Ok(ConfigValue::Array(items))
        }
        FieldMergeStrategy::Max | FieldMergeStrategy::Min => {
            let ordering = base.compare(over).ok_or_else(|| {
                format!(
                    "{} strategy requires comparable values, got {} and {}",
                    strategy.label(),
                    base.type_name(),
                    over.type_name()
                )
            })?;
            let take_over = match strategy {
                FieldMergeStrategy::Max => ordering.is_lt(),
                _ => ordering.is_gt(),
            };
            Ok(if take_over { over.clone() } else { base.clone() })
        }
    }
}

/// Drop repeated items, keeping the first occurrence of each.
fn dedup(items: impl Iterator<Item = ConfigValue>) -> Vec<ConfigValue> {
    let mut out: Vec<ConfigValue> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldMergeRule;
    use serde_json::json;

    fn tree(json: serde_json::Value) -> ConfigValue {
        ConfigValue::from(json)
    }

    fn rules(list: &[(&str, FieldMergeStrategy)]) -> FieldMergeRules {
        list.iter()
            .map(|(path, s)| FieldMergeRule::new(*path, *s))
            .collect()
    }

    #[test]
    fn test_last_wins_nested() {
        let merged = deep_merge(
            &[tree(json!({"a": {"x": 1, "y": 2}})), tree(json!({"a": {"y": 3, "z": 4}}))],
            MergeStrategy::LastWins,
            &FieldMergeRules::new(),
        )
        .unwrap();
        assert_eq!(merged, tree(json!({"a": {"x": 1, "y": 3, "z": 4}})));
    }

    #[test]
    fn test_first_wins_keeps_base_but_adds_new_keys() {
        let merged = deep_merge(
            &[tree(json!({"a": 1, "m": {"x": 1}})), tree(json!({"a": 2, "b": 3, "m": {"y": 2}}))],
            MergeStrategy::FirstWins,
            &FieldMergeRules::new(),
        )
        .unwrap();
        assert_eq!(merged, tree(json!({"a": 1, "m": {"x": 1, "y": 2}, "b": 3})));
    }

    #[test]
    fn test_map_replaced_by_scalar() {
        let merged = deep_merge(
            &[tree(json!({"a": {"x": 1}})), tree(json!({"a": "flat"}))],
            MergeStrategy::LastWins,
            &FieldMergeRules::new(),
        )
        .unwrap();
        assert_eq!(merged, tree(json!({"a": "flat"})));
    }

    #[test]
    fn test_lists_are_replaced_without_rule() {
        let merged = deep_merge(
            &[tree(json!({"tags": ["a"]})), tree(json!({"tags": ["b"]}))],
            MergeStrategy::LastWins,
            &FieldMergeRules::new(),
        )
        .unwrap();
        assert_eq!(merged, tree(json!({"tags": ["b"]})));
    }

    #[test]
    fn test_list_strategies() {
        let base = tree(json!(["a", "b"]));
        let over = tree(json!(["b", "c"]));
        let cases = [
            (FieldMergeStrategy::Append, json!(["a", "b", "b", "c"])),
            (FieldMergeStrategy::AppendUnique, json!(["a", "b", "c"])),
            (FieldMergeStrategy::Prepend, json!(["b", "c", "a", "b"])),
            (FieldMergeStrategy::PrependUnique, json!(["b", "c", "a"])),
        ];
        for (strategy, expected) in cases {
            assert_eq!(apply_field_merge(&base, &over, strategy).unwrap(), tree(expected), "{strategy}");
        }
    }

    #[test]
    fn test_list_strategy_type_error() {
        let err = apply_field_merge(&tree(json!("x")), &tree(json!(["y"])), FieldMergeStrategy::AppendUnique)
            .unwrap_err();
        assert_eq!(err, "APPEND_UNIQUE strategy requires both values to be lists, got str and list");
    }

    #[test]
    fn test_max_and_min() {
        let five = tree(json!(5));
        let nine = tree(json!(9.5));
        assert_eq!(apply_field_merge(&five, &nine, FieldMergeStrategy::Max).unwrap(), nine);
        assert_eq!(apply_field_merge(&five, &nine, FieldMergeStrategy::Min).unwrap(), five);
        assert_eq!(
            apply_field_merge(&tree(json!("b")), &tree(json!("a")), FieldMergeStrategy::Max).unwrap(),
            tree(json!("b"))
        );
    }

    #[test]
    fn test_max_on_lists_fails() {
        let err = deep_merge(
            &[tree(json!({"v": [1]})), tree(json!({"v": [2]}))],
            MergeStrategy::LastWins,
            &rules(&[("v", FieldMergeStrategy::Max)]),
        )
        .unwrap_err();
        let ConfigError::MergeTypes(errors) = err else {
            panic!("expected merge type errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "MAX strategy requires comparable values, got list and list");
        assert_eq!(errors[0].path, FieldPath::from("v"));
        assert_eq!(errors[0].source_index, 1);
    }

    #[test]
    fn test_type_errors_are_collected_across_fields_and_sources() {
        let rules = rules(&[("a", FieldMergeStrategy::Append), ("b", FieldMergeStrategy::Max)]);
        let trees = [
            tree(json!({"a": 1, "b": 1})),
            tree(json!({"a": [1], "b": [1]})),
            tree(json!({"a": [2], "c": 3})),
        ];
        let mut merger = Merger::new(MergeStrategy::LastWins, &rules);
        let mut acc = ConfigValue::empty_map();
        for (index, t) in trees.iter().enumerate() {
            acc = merger.merge_source(acc, t, index);
        }
        let found: Vec<(String, usize)> = merger
            .errors()
            .iter()
            .map(|e| (e.path.dotted(), e.source_index))
            .collect();
        assert_eq!(
            found,
            vec![("a".to_string(), 1), ("b".to_string(), 1), ("a".to_string(), 2)]
        );
        // Failed rules keep the earlier value; unrelated keys still merge.
        assert_eq!(acc, tree(json!({"a": 1, "b": 1, "c": 3})));

        let err = deep_merge(&trees, MergeStrategy::LastWins, &rules).unwrap_err();
        assert!(matches!(err, ConfigError::MergeTypes(ref errors) if errors.len() == 3));
    }

    #[test]
    fn test_rule_needs_both_sides() {
        // The first source introducing the key is a plain insert.
        let merged = deep_merge(
            &[tree(json!({})), tree(json!({"v": "not a list"}))],
            MergeStrategy::LastWins,
            &rules(&[("v", FieldMergeStrategy::Append)]),
        )
        .unwrap();
        assert_eq!(merged, tree(json!({"v": "not a list"})));
    }

    #[test]
    fn test_rule_owns_subtree() {
        let merged = deep_merge(
            &[tree(json!({"db": {"host": "a", "port": 1}})), tree(json!({"db": {"host": "b"}}))],
            MergeStrategy::LastWins,
            &rules(&[("db", FieldMergeStrategy::LastWins)]),
        )
        .unwrap();
        assert_eq!(merged, tree(json!({"db": {"host": "b"}})));
    }

    #[test]
    fn test_root_rule() {
        let merged = deep_merge(
            &[tree(json!({"a": 1})), tree(json!({"b": 2}))],
            MergeStrategy::LastWins,
            &rules(&[("", FieldMergeStrategy::FirstWins)]),
        )
        .unwrap();
        // The accumulator starts empty, so the first source wins the root.
        assert_eq!(merged, tree(json!({})));
    }

    #[test]
    fn test_provenance() {
        let trees = [
            tree(json!({"db": {"host": "a", "port": 1}, "tags": ["x"], "limit": 5})),
            tree(json!({"db": {"host": "b"}, "tags": ["y"], "limit": 3})),
            tree(json!({"limit": 7})),
        ];
        let rules = rules(&[("tags", FieldMergeStrategy::Append), ("limit", FieldMergeStrategy::Max)]);
        let mut merger = Merger::new(MergeStrategy::LastWins, &rules);
        let mut acc = ConfigValue::empty_map();
        for (index, t) in trees.iter().enumerate() {
            acc = merger.merge_source(acc, t, index);
        }
        let report = merger.into_report();
        assert_eq!(report.origin_of(&FieldPath::from("db.host")), Some(1));
        assert_eq!(report.origin_of(&FieldPath::from("db.port")), Some(0));
        assert_eq!(report.sources_of(&FieldPath::from("tags")), &[0, 1]);
        assert_eq!(report.origin_of(&FieldPath::from("limit")), Some(2));
        assert_eq!(acc.get(&FieldPath::from("limit")), Some(&ConfigValue::Integer(7)));
    }

    #[test]
    fn test_filled_empty_map_is_no_longer_a_leaf() {
        let rules = FieldMergeRules::new();
        let mut merger = Merger::new(MergeStrategy::LastWins, &rules);
        let acc = merger.merge_source(ConfigValue::empty_map(), &tree(json!({"x": {}})), 0);
        let acc = merger.merge_source(acc, &tree(json!({"x": {"a": 1}})), 1);
        assert_eq!(acc, tree(json!({"x": {"a": 1}})));
        let report = merger.into_report();
        let leaves: Vec<&str> = report.iter().map(|(path, _)| path).collect();
        assert_eq!(leaves, vec!["x.a"]);
    }

    #[test]
    fn test_idempotent_merge() {
        let a = tree(json!({"a": {"b": [1, 2]}, "c": "x"}));
        let merged = deep_merge(&[a.clone(), a.clone()], MergeStrategy::LastWins, &FieldMergeRules::new()).unwrap();
        assert_eq!(merged, a);
    }
}
