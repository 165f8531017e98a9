//! End-to-end behaviour of `merge_sources`.

use confmerge_config::{
    ConfigError, ConfigValue, FieldGroup, FieldMergeRule, FieldMergeStrategy, FieldPath,
    MergeSettings, MergeStrategy, merge_sources,
};
use serde_json::json;

fn trees(values: Vec<serde_json::Value>) -> Vec<ConfigValue> {
    values.into_iter().map(ConfigValue::from).collect()
}

fn settings(strategy: MergeStrategy) -> MergeSettings {
    MergeSettings {
        strategy,
        ..MergeSettings::default()
    }
}

#[test]
fn test_last_wins_and_first_wins() {
    let input = trees(vec![json!({"host": "a", "port": 1}), json!({"host": "b"})]);

    let last = merge_sources(&input, &settings(MergeStrategy::LastWins)).unwrap();
    assert_eq!(last.value, ConfigValue::from(json!({"host": "b", "port": 1})));

    let first = merge_sources(&input, &settings(MergeStrategy::FirstWins)).unwrap();
    assert_eq!(first.value, ConfigValue::from(json!({"host": "a", "port": 1})));
}

#[test]
fn test_raise_on_conflict() {
    let input = trees(vec![json!({"host": "a"}), json!({"host": "b"})]);
    let err = merge_sources(&input, &settings(MergeStrategy::RaiseOnConflict)).unwrap_err();
    let ConfigError::Conflicts(conflicts) = err else {
        panic!("expected conflicts, got {err:?}");
    };
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].path, FieldPath::from("host"));
    assert_eq!(conflicts[0].sources, vec![0, 1]);
}

#[test]
fn test_raise_on_conflict_merges_when_sources_agree() {
    let input = trees(vec![json!({"host": "a", "port": 1}), json!({"host": "a", "debug": true})]);
    let merged = merge_sources(&input, &settings(MergeStrategy::RaiseOnConflict)).unwrap();
    assert_eq!(merged.value, ConfigValue::from(json!({"host": "a", "port": 1, "debug": true})));
}

#[test]
fn test_field_rule_resolves_conflict() {
    let input = trees(vec![json!({"tags": ["a"]}), json!({"tags": ["b", "a"]})]);
    let mut settings = settings(MergeStrategy::RaiseOnConflict);
    settings.rules = [FieldMergeRule::new("tags", FieldMergeStrategy::AppendUnique)]
        .into_iter()
        .collect();
    let merged = merge_sources(&input, &settings).unwrap();
    assert_eq!(merged.value, ConfigValue::from(json!({"tags": ["a", "b"]})));
    assert_eq!(merged.report.sources_of(&FieldPath::from("tags")), &[0, 1]);
}

#[test]
fn test_max_rule() {
    let input = trees(vec![json!({"workers": 4}), json!({"workers": 8}), json!({"workers": 2})]);
    let mut settings = settings(MergeStrategy::LastWins);
    settings.rules = [FieldMergeRule::new("workers", FieldMergeStrategy::Max)]
        .into_iter()
        .collect();
    let merged = merge_sources(&input, &settings).unwrap();
    assert_eq!(merged.value, ConfigValue::from(json!({"workers": 8})));
    assert_eq!(merged.report.origin_of(&FieldPath::from("workers")), Some(1));
}

#[test]
fn test_append_on_scalars_is_a_type_error() {
    let input = trees(vec![json!({"tags": "a"}), json!({"tags": ["b"]})]);
    let mut settings = settings(MergeStrategy::LastWins);
    settings.rules = [FieldMergeRule::new("tags", FieldMergeStrategy::Append)]
        .into_iter()
        .collect();
    let err = merge_sources(&input, &settings).unwrap_err();
    assert_eq!(
        err.to_string(),
        "[tags] APPEND strategy requires both values to be lists, got str and list"
    );
}

#[test]
fn test_type_errors_do_not_stop_the_fold() {
    let input = trees(vec![json!({"a": 1, "b": 1}), json!({"a": [1], "b": [1]})]);
    let mut settings = settings(MergeStrategy::LastWins);
    settings.rules = [
        FieldMergeRule::new("a", FieldMergeStrategy::Append),
        FieldMergeRule::new("b", FieldMergeStrategy::Max),
    ]
    .into_iter()
    .collect();

    let Err(ConfigError::MergeTypes(errors)) = merge_sources(&input, &settings) else {
        panic!("expected merge type errors");
    };
    let paths: Vec<String> = errors.iter().map(|e| e.path.dotted()).collect();
    assert_eq!(paths, vec!["a", "b"]);
    assert!(errors.iter().all(|e| e.source_index == 1));
    assert_eq!(errors[1].message, "MAX strategy requires comparable values, got int and list");
}

#[test]
fn test_field_group_partial_override() {
    let input = trees(vec![
        json!({"host": "h1", "port": 1}),
        json!({"host": "h2"}),
    ]);
    let mut settings = settings(MergeStrategy::LastWins);
    settings.groups = vec![FieldGroup::new(["host", "port"])];

    let err = merge_sources(&input, &settings).unwrap_err();
    let ConfigError::FieldGroups(violations) = err else {
        panic!("expected field group violations, got {err:?}");
    };
    assert_eq!(violations.len(), 1);
    let violation = &violations[0];
    assert_eq!(violation.source_index, 1);
    assert_eq!(violation.changed, vec![(FieldPath::from("host"), 1)]);
    assert_eq!(violation.unchanged, vec![(FieldPath::from("port"), Some(0))]);
}

#[test]
fn test_field_group_violations_are_collected_across_sources() {
    let input = trees(vec![
        json!({"db": {"host": "h1", "port": 1}}),
        json!({"db": {"host": "h2"}}),
        json!({"db": {"port": 3}}),
    ]);
    let mut settings = settings(MergeStrategy::LastWins);
    settings.groups = vec![FieldGroup::new(["db"])];

    let Err(ConfigError::FieldGroups(violations)) = merge_sources(&input, &settings) else {
        panic!("expected field group violations");
    };
    let sources: Vec<usize> = violations.iter().map(|v| v.source_index).collect();
    assert_eq!(sources, vec![1, 2]);
    assert_eq!(violations[1].unchanged, vec![(FieldPath::from("db.host"), Some(1))]);
}

#[test]
fn test_merge_is_idempotent() {
    let tree = json!({"a": {"b": 1, "c": [1, 2]}, "d": "x"});
    let merged = merge_sources(&trees(vec![tree.clone(), tree.clone()]), &MergeSettings::default()).unwrap();
    assert_eq!(merged.value, ConfigValue::from(tree));
}

#[test]
fn test_provenance_tracks_last_setter() {
    let input = trees(vec![
        json!({"db": {"host": "a", "port": 1}}),
        json!({"db": {"port": 2}}),
    ]);
    let merged = merge_sources(&input, &MergeSettings::default()).unwrap();
    assert_eq!(merged.report.origin_of(&FieldPath::from("db.host")), Some(0));
    assert_eq!(merged.report.origin_of(&FieldPath::from("db.port")), Some(1));
    assert_eq!(merged.report.attribute(&FieldPath::from("db")), Some(1));
}
