//! Utility functions for building excerpts from source text

use crate::types::LineRange;

/// Displayed excerpt lines longer than this are truncated.
pub const MAX_EXCERPT_WIDTH: usize = 80;

/// The text of a single 1-based line, if it exists.
pub fn line_at(text: &str, line: usize) -> Option<&str> {
    if line == 0 {
        return None;
    }
    text.lines().nth(line - 1)
}

/// Extract the lines covered by `range`, dedented and truncated for display.
///
/// Lines past the end of `text` are silently dropped.
pub fn excerpt(text: &str, range: LineRange) -> Vec<String> {
    if range.start == 0 {
        return Vec::new();
    }
    let captured: Vec<&str> = text
        .lines()
        .skip(range.start - 1)
        .take(range.line_count())
        .collect();
    dedent(&captured)
        .into_iter()
        .map(|line| truncate_line(&line))
        .collect()
}

/// Strip the leading whitespace common to every non-blank line.
///
/// Blank lines do not participate in the computation and come back empty.
pub fn dedent(lines: &[&str]) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.chars().skip(common).collect::<String>().trim_end().to_string()
            }
        })
        .collect()
}

/// Truncate a line longer than [`MAX_EXCERPT_WIDTH`] characters to 77 characters plus `...`.
pub fn truncate_line(line: &str) -> String {
    if line.chars().count() > MAX_EXCERPT_WIDTH {
        let mut truncated: String = line.chars().take(MAX_EXCERPT_WIDTH - 3).collect();
        truncated.push_str("...");
        truncated
    } else {
        line.to_string()
    }
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_at() {
        let text = "one\ntwo\r\nthree";
        assert_eq!(line_at(text, 1), Some("one"));
        assert_eq!(line_at(text, 2), Some("two"));
        assert_eq!(line_at(text, 3), Some("three"));
        assert_eq!(line_at(text, 4), None);
        assert_eq!(line_at(text, 0), None);
    }

    #[test]
    fn test_excerpt_dedents_common_indent() {
        let text = "root:\n    inner:\n      x: 1\n    other: 2\n";
        let lines = excerpt(text, LineRange::new(2, 3));
        assert_eq!(lines, vec!["inner:", "  x: 1"]);
    }

    #[test]
    fn test_excerpt_single_line_strips_indent() {
        let text = "{\n  \"port\": 8080\n}";
        assert_eq!(excerpt(text, LineRange::single(2)), vec!["\"port\": 8080"]);
    }

    #[test]
    fn test_excerpt_out_of_bounds() {
        assert!(excerpt("a\nb", LineRange::new(5, 9)).is_empty());
        assert_eq!(excerpt("a\nb", LineRange::new(2, 9)), vec!["b"]);
    }

    #[test]
    fn test_dedent_ignores_blank_lines() {
        let lines = dedent(&["    a", "", "      b"]);
        assert_eq!(lines, vec!["a", "", "  b"]);
    }

    #[test]
    fn test_truncate_line() {
        let exact = "x".repeat(80);
        assert_eq!(truncate_line(&exact), exact);

        let long = "y".repeat(81);
        let truncated = truncate_line(&long);
        assert_eq!(truncated.chars().count(), 80);
        assert!(truncated.ends_with("yyy..."));
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let line = "é".repeat(80);
        assert_eq!(truncate_line(&line), line);
    }
}
