//! Behaviour shared by every path finder.

use confmerge_locate::PathFinder;
use confmerge_source_map::{LineRange, SourceKind};

fn path(dotted: &str) -> Vec<String> {
    dotted.split('.').map(str::to_string).collect()
}

fn finder(kind: SourceKind) -> PathFinder {
    PathFinder::for_kind(kind).unwrap()
}

/// The same logical document in each format, with `database.port` on line 3.
fn documents() -> Vec<(SourceKind, &'static str)> {
    vec![
        (
            SourceKind::Json,
            "{\n  \"database\": {\n    \"port\": 5432,\n    \"host\": \"db\"\n  }\n}\n",
        ),
        (
            SourceKind::Json5,
            "{\n  database: {\n    port: 5432, // primary\n    host: 'db',\n  },\n}\n",
        ),
        (
            SourceKind::Toml,
            "# settings\n[database]\nport = 5432\nhost = \"db\"\n",
        ),
        (
            SourceKind::Yaml,
            "# settings\ndatabase:\n  port: 5432\n  host: db\n",
        ),
        (
            SourceKind::Ini,
            "; settings\n[database]\nport = 5432\nhost = db\n",
        ),
    ]
}

#[test]
fn test_single_line_scalar_is_on_key_line() {
    for (kind, text) in documents() {
        assert_eq!(
            finder(kind).find_line_range(text, &path("database.port")),
            Some(LineRange::single(3)),
            "kind {}",
            kind
        );
        assert_eq!(
            finder(kind).find_line_range(text, &path("database.host")),
            Some(LineRange::single(4)),
            "kind {}",
            kind
        );
    }
}

#[test]
fn test_missing_path_is_none_everywhere() {
    for (kind, text) in documents() {
        assert_eq!(finder(kind).find_line_range(text, &path("database.user")), None, "kind {}", kind);
        assert_eq!(finder(kind).find_line_range(text, &path("port")), None, "kind {}", kind);
        assert_eq!(finder(kind).find_line_range(text, &[]), None, "kind {}", kind);
    }
}

#[test]
fn test_key_text_inside_string_values_is_ignored() {
    let cases = [
        (SourceKind::Json, "{\"note\": \"port: 1, \\\"port\\\": 2\",\n\"port\": 3}", 2),
        (SourceKind::Json5, "{note: 'port: 1',\nport: 3}", 2),
        (SourceKind::Toml, "note = \"port = 1\"\nport = 3\n", 2),
        (SourceKind::Yaml, "note: \"port: 1\"\nport: 3\n", 2),
    ];
    for (kind, text, line) in cases {
        assert_eq!(
            finder(kind).find_line_range(text, &path("port")),
            Some(LineRange::single(line)),
            "kind {}",
            kind
        );
    }
}

#[test]
fn test_env_kinds_have_no_path_finder() {
    assert_eq!(PathFinder::for_kind(SourceKind::Env), None);
    assert_eq!(PathFinder::for_kind(SourceKind::EnvFile), None);
}

#[test]
fn test_garbage_input_never_panics() {
    let garbage = [
        "",
        "\n\n\n",
        "{{{{[[[[",
        "]]]]}}}}",
        "\"\\",
        "'''\n\"\"\"",
        "[[]]\n[=]\n= =\n",
        "- - - :\n  ? x\n: y",
        "é: ü\n  - ß",
    ];
    for kind in [SourceKind::Json, SourceKind::Json5, SourceKind::Toml, SourceKind::Yaml, SourceKind::Ini] {
        for text in garbage {
            let _ = finder(kind).find_line_range(text, &path("a.b"));
            let _ = finder(kind).find_line_range(text, &path("0"));
        }
    }
}
