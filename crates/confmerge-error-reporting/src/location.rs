//! Rendering of source locations under an error line.

use confmerge_source_map::{SourceKind, SourceLocation, truncate_line};
use std::path::Path;

const BRANCH: &str = "   └── ";
const EXCERPT_INDENT: &str = "       ";

/// The lines describing `location`, excerpt included.
pub fn format_location(location: &SourceLocation) -> Vec<String> {
    let mut out = Vec::new();
    match location {
        SourceLocation::Env { var_name } => {
            out.push(format!("{BRANCH}ENV '{var_name}'"));
        }
        SourceLocation::EnvFile {
            path,
            var_name,
            lines,
            ..
        } => {
            out.push(format!(
                "{BRANCH}ENV FILE '{}', var '{var_name}'",
                path.display()
            ));
            push_excerpt(&mut out, lines.as_deref());
        }
        SourceLocation::File {
            path, range, lines, ..
        } => {
            let mut header = format!("{BRANCH}FILE '{}'", path.display());
            if let Some(range) = range {
                header.push_str(&format!(", {range}"));
            }
            out.push(header);
            push_excerpt(&mut out, lines.as_deref());
        }
    }
    out
}

fn push_excerpt(out: &mut Vec<String>, lines: Option<&[String]>) {
    for line in lines.unwrap_or_default() {
        out.push(format!("{EXCERPT_INDENT}{}", truncate_line(line)));
    }
}

/// How a source is named in field group errors: `json 'a.json'`, or just
/// the kind for sources without a file.
pub fn source_repr(kind: SourceKind, path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("{kind} '{}'", path.display()),
        None => kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confmerge_source_map::LineRange;
    use std::path::PathBuf;

    #[test]
    fn test_file_location_with_excerpt() {
        let location = SourceLocation::File {
            kind: SourceKind::Json,
            path: PathBuf::from("config.json"),
            range: Some(LineRange::new(2, 4)),
            lines: Some(vec!["\"db\": {".into(), "  \"port\": 1".into(), "}".into()]),
        };
        assert_eq!(
            format_location(&location),
            vec![
                "   └── FILE 'config.json', line 2-4",
                "       \"db\": {",
                "         \"port\": 1",
                "       }",
            ]
        );
    }

    #[test]
    fn test_file_only_location() {
        let location = SourceLocation::file_only(SourceKind::Toml, "app.toml");
        assert_eq!(format_location(&location), vec!["   └── FILE 'app.toml'"]);
    }

    #[test]
    fn test_env_locations() {
        assert_eq!(
            format_location(&SourceLocation::env("APP_PORT")),
            vec!["   └── ENV 'APP_PORT'"]
        );
        let location = SourceLocation::EnvFile {
            path: PathBuf::from(".env"),
            var_name: "APP_PORT".into(),
            range: Some(LineRange::single(3)),
            lines: Some(vec!["APP_PORT=abc".into()]),
        };
        assert_eq!(
            format_location(&location),
            vec!["   └── ENV FILE '.env', var 'APP_PORT'", "       APP_PORT=abc"]
        );
    }

    #[test]
    fn test_long_excerpt_lines_are_truncated() {
        let long = "x".repeat(100);
        let location = SourceLocation::File {
            kind: SourceKind::Yaml,
            path: PathBuf::from("a.yaml"),
            range: Some(LineRange::single(1)),
            lines: Some(vec![long]),
        };
        let rendered = format_location(&location);
        assert_eq!(rendered[1], format!("       {}...", "x".repeat(77)));
    }

    #[test]
    fn test_source_repr() {
        assert_eq!(source_repr(SourceKind::Json, Some(Path::new("a.json"))), "json 'a.json'");
        assert_eq!(source_repr(SourceKind::Env, None), "env");
    }
}
