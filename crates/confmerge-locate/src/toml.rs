//! TOML path finder.
//!
//! Tracks the current table header, dotted keys, multi-line strings and
//! inline tables/arrays that span several lines. Lines inside an unclosed
//! multi-line value never count as key lines.

use crate::lines::{BracketDepth, LineScanner, closing_line, find_unquoted, split_dotted_key};
use confmerge_source_map::LineRange;
use std::collections::HashMap;

const MULTILINE_DELIMITERS: [&str; 2] = ["\"\"\"", "'''"];

#[derive(Debug, Default)]
pub(crate) struct TomlScanner {
    /// Header segments as written
    table: Vec<String>,
    /// Header segments with `[[array]]` element indices inserted
    indexed_table: Vec<String>,
    array_tables: HashMap<Vec<String>, usize>,
    open: OpenValue,
}

#[derive(Debug, Default)]
enum OpenValue {
    #[default]
    None,
    String(&'static str),
    Container(BracketDepth),
}

impl LineScanner for TomlScanner {
    fn process_line(&mut self, lines: &[&str], index: usize, target: &[String]) -> Option<LineRange> {
        let line = lines[index];
        if self.continue_open_value(line) {
            return None;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        if let Some((name, is_array)) = table_header(trimmed) {
            self.enter_table(split_dotted_key(name), is_array);
            if self.table == target || self.indexed_table == target {
                return Some(LineRange::new(index + 1, table_end(lines, index)));
            }
            return None;
        }

        let eq = find_unquoted(trimmed, b'=')?;
        let keys = split_dotted_key(&trimmed[..eq]);
        let value = trimmed[eq + 1..].trim();
        let is_target = self.key_matches(&keys, target);

        if let Some(delimiter) = unclosed_multiline(value) {
            if is_target {
                return Some(LineRange::new(index + 1, multiline_end(lines, index, delimiter)));
            }
            self.open = OpenValue::String(delimiter);
            return None;
        }

        if value.starts_with('[') || value.starts_with('{') {
            let mut state = BracketDepth::default();
            state.feed(value);
            if state.is_open() {
                if is_target {
                    return Some(LineRange::new(index + 1, closing_line(lines, index, state)));
                }
                self.open = OpenValue::Container(state);
                return None;
            }
        }

        is_target.then(|| LineRange::single(index + 1))
    }
}

impl TomlScanner {
    /// Consume `line` if it belongs to a multi-line value opened earlier.
    fn continue_open_value(&mut self, line: &str) -> bool {
        match &mut self.open {
            OpenValue::None => false,
            OpenValue::String(delimiter) => {
                if line.contains(*delimiter) {
                    self.open = OpenValue::None;
                }
                true
            }
            OpenValue::Container(state) => {
                state.feed(line);
                if !state.is_open() {
                    self.open = OpenValue::None;
                }
                true
            }
        }
    }

    fn open_value(&mut self, value: &str) {
        if let Some(delimiter) = unclosed_multiline(value) {
            self.open = OpenValue::String(delimiter);
        } else if value.starts_with('[') || value.starts_with('{') {
            let mut state = BracketDepth::default();
            state.feed(value);
            if state.is_open() {
                self.open = OpenValue::Container(state);
            }
        }
    }

    fn enter_table(&mut self, segments: Vec<String>, is_array: bool) {
        let mut indexed: Vec<String> = Vec::with_capacity(segments.len() + 1);
        let last = segments.len().saturating_sub(1);
        for (position, segment) in segments.iter().enumerate() {
            indexed.push(segment.clone());
            if position == last && is_array {
                let count = self.array_tables.entry(indexed.clone()).or_insert(0);
                indexed.push(count.to_string());
                *count += 1;
            } else if let Some(count) = self.array_tables.get(&indexed) {
                indexed.push(count.saturating_sub(1).to_string());
            }
        }
        self.table = segments;
        self.indexed_table = indexed;
    }

    fn key_matches(&self, keys: &[String], target: &[String]) -> bool {
        [&self.table, &self.indexed_table].iter().any(|table| {
            target.len() == table.len() + keys.len()
                && target.starts_with(table)
                && &target[table.len()..] == keys
        })
    }
}

/// `[a.b]` or `[[a.b]]`, returning the inner name and whether it is an array of tables.
fn table_header(trimmed: &str) -> Option<(&str, bool)> {
    if let Some(inner) = trimmed.strip_prefix("[[") {
        let close = find_unquoted(inner, b']')?;
        return Some((inner[..close].trim(), true));
    }
    let inner = trimmed.strip_prefix('[')?;
    let close = find_unquoted(inner, b']')?;
    Some((inner[..close].trim(), false))
}

/// The delimiter of a multi-line string that opens `value` and stays open past this line.
///
/// Only a delimiter at the start of the value opens a string; delimiters inside
/// single-line strings or trailing comments do not.
fn unclosed_multiline(value: &str) -> Option<&'static str> {
    MULTILINE_DELIMITERS.into_iter().find(|delimiter| {
        value
            .strip_prefix(delimiter)
            .is_some_and(|rest| !rest.contains(delimiter))
    })
}

fn multiline_end(lines: &[&str], index: usize, delimiter: &str) -> usize {
    lines
        .iter()
        .enumerate()
        .skip(index + 1)
        .find(|(_, line)| line.contains(delimiter))
        .map_or(index + 1, |(offset, _)| offset + 1)
}

/// Last content line of a table, stopping at the next header.
fn table_end(lines: &[&str], index: usize) -> usize {
    let mut body = TomlScanner::default();
    let mut end = index + 1;
    for (offset, line) in lines.iter().enumerate().skip(index + 1) {
        if body.continue_open_value(line) {
            end = offset + 1;
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if table_header(trimmed).is_some() {
            break;
        }
        end = offset + 1;
        if let Some(eq) = find_unquoted(trimmed, b'=') {
            body.open_value(trimmed[eq + 1..].trim());
        }
    }
    end
}
