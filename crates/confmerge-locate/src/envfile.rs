//! Line scanner for `KEY=value` env files.

use crate::lines::{BracketDepth, closing_line, indent_of, is_blank};
use confmerge_source_map::LineRange;

/// Find the line(s) defining `var_name` in an env file.
///
/// Blank lines and `#` comments are skipped and an `export ` prefix is
/// ignored. A quoted value left open runs to the line holding its closing
/// quote; otherwise indented continuation lines extend the range.
pub fn find_env_var(text: &str, var_name: &str) -> Option<LineRange> {
    let lines: Vec<&str> = text.lines().collect();
    let mut skip_until = 0;
    for (index, line) in lines.iter().enumerate() {
        if index < skip_until {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let assignment = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value)) = assignment.split_once('=') else {
            continue;
        };

        let end = value_end(&lines, index, value.trim_start());
        if key.trim() == var_name {
            return Some(LineRange::new(index + 1, end));
        }
        skip_until = end;
    }
    None
}

/// 1-based last line of the value starting on line `index`.
fn value_end(lines: &[&str], index: usize, value: &str) -> usize {
    if value.starts_with(['"', '\'']) {
        let mut state = BracketDepth::default();
        state.feed(value);
        if state.is_open() {
            return closing_line(lines, index, state);
        }
        return index + 1;
    }

    let mut end = index + 1;
    for (offset, line) in lines.iter().enumerate().skip(index + 1) {
        if is_blank(line) || indent_of(line) == 0 {
            break;
        }
        end = offset + 1;
    }
    end
}
