//! YAML path finder.
//!
//! An indentation stack of mapping keys and sequence items. Each entry keeps
//! the column it starts at; a new line pops every entry at or right of its
//! own column before pushing itself. Sequence items get stringified indices
//! counted per owning entry, so `servers.0.host` resolves.
//!
//! Block scalars (`|`, `>`) and unclosed flow collections or quoted scalars
//! suppress key detection until they end.

use crate::lines::{BracketDepth, LineScanner, closing_line, indent_of, is_blank};
use confmerge_source_map::LineRange;

#[derive(Debug)]
struct Entry {
    segment: String,
    column: usize,
    is_item: bool,
    /// Sequence items seen directly under this entry
    items: usize,
}

#[derive(Debug, Default)]
enum Pending {
    #[default]
    None,
    BlockScalar {
        parent_column: usize,
    },
    Flow(BracketDepth),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    /// Children of a key with an empty value; may be a compact sequence
    Nested,
    /// Content of a `|`/`>` scalar, where `#` lines are text
    Scalar,
    /// Continuation of a sequence item
    Item,
}

#[derive(Debug, Default)]
pub(crate) struct YamlScanner {
    stack: Vec<Entry>,
    root_items: usize,
    pending: Pending,
}

impl LineScanner for YamlScanner {
    fn process_line(&mut self, lines: &[&str], index: usize, target: &[String]) -> Option<LineRange> {
        let line = lines[index];
        if self.skip_pending(line) {
            return None;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        if is_document_marker(line) {
            self.stack.clear();
            self.root_items = 0;
            return None;
        }

        let mut rest = &line[indent_of(line)..];
        while let Some(after_dash) = sequence_item(rest) {
            let column = line.len() - rest.len();
            self.push_item(column);
            let content = after_dash.trim_start();
            if self.path_equals(target) {
                return Some(LineRange::new(index + 1, item_end(lines, index, column, content)));
            }
            if content.is_empty() || content.starts_with('#') {
                return None;
            }
            rest = content;
            if sequence_item(rest).is_none() && split_key(rest).is_none() {
                self.open_pending(rest, column);
                return None;
            }
        }

        let column = line.len() - rest.len();
        let (key, value) = split_key(rest)?;
        while self.stack.last().is_some_and(|top| top.column >= column) {
            self.stack.pop();
        }
        self.stack.push(Entry {
            segment: key,
            column,
            is_item: false,
            items: 0,
        });

        let value = strip_properties(strip_comment(value).trim());
        if self.path_equals(target) {
            return Some(LineRange::new(index + 1, key_value_end(lines, index, column, value)));
        }
        if !value.is_empty() {
            self.open_pending(value, column);
        }
        None
    }
}

impl YamlScanner {
    /// Consume lines that belong to an open block scalar or flow value.
    fn skip_pending(&mut self, line: &str) -> bool {
        match &mut self.pending {
            Pending::None => false,
            Pending::BlockScalar { parent_column } => {
                if is_blank(line) || indent_of(line) > *parent_column {
                    return true;
                }
                self.pending = Pending::None;
                false
            }
            Pending::Flow(state) => {
                state.feed(line);
                if !state.is_open() {
                    self.pending = Pending::None;
                }
                true
            }
        }
    }

    fn open_pending(&mut self, value: &str, parent_column: usize) {
        if is_block_indicator(value) {
            self.pending = Pending::BlockScalar { parent_column };
        } else if let Some(state) = open_flow(value) {
            self.pending = Pending::Flow(state);
        }
    }

    fn push_item(&mut self, column: usize) {
        while self
            .stack
            .last()
            .is_some_and(|top| top.column > column || (top.column == column && top.is_item))
        {
            self.stack.pop();
        }
        let index = match self.stack.last_mut() {
            Some(owner) => {
                owner.items += 1;
                owner.items - 1
            }
            None => {
                self.root_items += 1;
                self.root_items - 1
            }
        };
        self.stack.push(Entry {
            segment: index.to_string(),
            column,
            is_item: true,
            items: 0,
        });
    }

    fn path_equals(&self, target: &[String]) -> bool {
        self.stack.len() == target.len()
            && self
                .stack
                .iter()
                .zip(target)
                .all(|(entry, segment)| entry.segment == *segment)
    }
}

fn is_document_marker(line: &str) -> bool {
    line == "---" || line.starts_with("--- ") || line == "..." || line.starts_with("... ")
}

/// The text after a `- ` sequence indicator.
fn sequence_item(rest: &str) -> Option<&str> {
    if rest == "-" {
        return Some("");
    }
    rest.strip_prefix("- ").or_else(|| rest.strip_prefix("-\t"))
}

/// Split `key: value` into the key and the raw value text.
///
/// The colon must be followed by whitespace or end the line. Quoted keys may
/// contain colons. Flow collections, aliases and other indicators are not keys.
fn split_key(rest: &str) -> Option<(String, &str)> {
    let bytes = rest.as_bytes();
    let first = *bytes.first()?;

    if first == b'"' || first == b'\'' {
        let close = closing_quote(rest, first)?;
        let key = rest[1..close].to_string();
        let after = rest[close + 1..].trim_start();
        let value = after.strip_prefix(':')?;
        if !(value.is_empty() || value.starts_with([' ', '\t'])) {
            return None;
        }
        return Some((key, value));
    }

    if b"[{#&*!|>%@`?".contains(&first) {
        return None;
    }

    for (pos, b) in bytes.iter().enumerate() {
        match b {
            b'#' if pos > 0 && matches!(bytes[pos - 1], b' ' | b'\t') => return None,
            b':' if matches!(bytes.get(pos + 1), None | Some(b' ' | b'\t')) => {
                let key = rest[..pos].trim_end();
                if key.is_empty() {
                    return None;
                }
                return Some((key.to_string(), &rest[pos + 1..]));
            }
            _ => {}
        }
    }
    None
}

fn closing_quote(text: &str, quote: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut pos = 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if quote == b'"' => pos += 2,
            b if b == quote => {
                if quote == b'\'' && bytes.get(pos + 1) == Some(&b'\'') {
                    pos += 2;
                } else {
                    return Some(pos);
                }
            }
            _ => pos += 1,
        }
    }
    None
}

/// Drop a trailing ` # comment`; quotes and brackets are honoured only for quoted or flow values.
fn strip_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    let structured = value
        .trim_start()
        .starts_with(['"', '\'', '[', '{']);
    let mut in_string: Option<u8> = None;
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        if let Some(quote) = in_string {
            if b == b'\\' && quote == b'"' {
                pos += 2;
                continue;
            }
            if b == quote {
                in_string = None;
            }
        } else if b == b'#' && (pos == 0 || matches!(bytes[pos - 1], b' ' | b'\t')) {
            return &value[..pos];
        } else if structured && (b == b'"' || b == b'\'') {
            in_string = Some(b);
        }
        pos += 1;
    }
    value
}

/// Skip leading `&anchor` and `!tag` properties.
fn strip_properties(mut value: &str) -> &str {
    while value.starts_with(['&', '!']) {
        let end = value.find([' ', '\t']).unwrap_or(value.len());
        value = value[end..].trim_start();
    }
    value
}

fn is_block_indicator(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some('|' | '>')) && chars.all(|c| c == '+' || c == '-' || c.is_ascii_digit())
}

/// A flow collection or quoted scalar that does not close on this line.
fn open_flow(value: &str) -> Option<BracketDepth> {
    if !value.starts_with(['[', '{', '"', '\'']) {
        return None;
    }
    let mut state = BracketDepth::default();
    state.feed(value);
    state.is_open().then_some(state)
}

fn key_value_end(lines: &[&str], index: usize, column: usize, value: &str) -> usize {
    if value.is_empty() {
        block_end(lines, index, column, Block::Nested)
    } else if is_block_indicator(value) {
        block_end(lines, index, column, Block::Scalar)
    } else if let Some(state) = open_flow(value) {
        closing_line(lines, index, state)
    } else {
        index + 1
    }
}

fn item_end(lines: &[&str], index: usize, column: usize, content: &str) -> usize {
    let content = strip_properties(strip_comment(content).trim());
    if is_block_indicator(content) {
        block_end(lines, index, column, Block::Scalar)
    } else if let Some(state) = open_flow(content) {
        closing_line(lines, index, state)
    } else {
        block_end(lines, index, column, Block::Item)
    }
}

/// Last line indented deeper than `column` following line `index`.
fn block_end(lines: &[&str], index: usize, column: usize, block: Block) -> usize {
    let mut end = index + 1;
    for (offset, line) in lines.iter().enumerate().skip(index + 1) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = indent_of(line);
        if trimmed.starts_with('#') && !(block == Block::Scalar && indent > column) {
            continue;
        }
        let compact_item = block == Block::Nested
            && indent == column
            && sequence_item(&line[indent..]).is_some();
        if indent > column || compact_item {
            end = offset + 1;
        } else {
            break;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use crate::lines::scan_lines;

    use super::*;

    fn find(text: &str, dotted: &str) -> Option<LineRange> {
        let target: Vec<String> = dotted.split('.').map(str::to_string).collect();
        scan_lines(YamlScanner::default(), text, &target)
    }

    const SAMPLE: &str = "\
app:
  name: demo
  description: |
    name: not a key
    more text
  port: 8080
servers:
  - host: a
    port: 1
  - host: b
tags:
- x
- y
matrix:
  - - 1
    - 2
empty:
flow: [1,
  2]
";

    #[test]
    fn test_single_line_scalars() {
        assert_eq!(find(SAMPLE, "app.name"), Some(LineRange::single(2)));
        assert_eq!(find(SAMPLE, "app.port"), Some(LineRange::single(6)));
        assert_eq!(find(SAMPLE, "empty"), Some(LineRange::single(17)));
    }

    #[test]
    fn test_nested_mapping_range() {
        assert_eq!(find(SAMPLE, "app"), Some(LineRange::new(1, 6)));
        assert_eq!(find(SAMPLE, "servers"), Some(LineRange::new(7, 10)));
    }

    #[test]
    fn test_block_scalar_hides_keys() {
        assert_eq!(find(SAMPLE, "app.description"), Some(LineRange::new(3, 5)));
        assert_eq!(find("a: |\n  b: 1\nb: 2\n", "b"), Some(LineRange::single(3)));
    }

    #[test]
    fn test_sequence_items() {
        assert_eq!(find(SAMPLE, "servers.0"), Some(LineRange::new(8, 9)));
        assert_eq!(find(SAMPLE, "servers.0.port"), Some(LineRange::single(9)));
        assert_eq!(find(SAMPLE, "servers.1.host"), Some(LineRange::single(10)));
        assert_eq!(find(SAMPLE, "servers.2"), None);
    }

    #[test]
    fn test_compact_sequence() {
        assert_eq!(find(SAMPLE, "tags"), Some(LineRange::new(11, 13)));
        assert_eq!(find(SAMPLE, "tags.1"), Some(LineRange::single(13)));
    }

    #[test]
    fn test_nested_sequences() {
        assert_eq!(find(SAMPLE, "matrix.0.1"), Some(LineRange::single(16)));
        assert_eq!(find(SAMPLE, "matrix.0"), Some(LineRange::new(15, 16)));
    }

    #[test]
    fn test_multiline_flow_value() {
        assert_eq!(find(SAMPLE, "flow"), Some(LineRange::new(18, 19)));
    }

    #[test]
    fn test_quoted_keys_and_colons_in_values() {
        let text = "\"quoted key\": 1\n'a:b': 2\nurl: http://example.com:80\ntime: 12:30\n";
        assert_eq!(find(text, "quoted key"), Some(LineRange::single(1)));
        assert_eq!(
            scan_lines(YamlScanner::default(), text, &["a:b".to_string()]),
            Some(LineRange::single(2))
        );
        assert_eq!(find(text, "url"), Some(LineRange::single(3)));
        assert_eq!(find(text, "time"), Some(LineRange::single(4)));
    }

    #[test]
    fn test_comments_and_document_marker() {
        let text = "---\n# port: 1\nport: 2 # the port\n";
        assert_eq!(find(text, "port"), Some(LineRange::single(3)));
    }

    #[test]
    fn test_multiline_quoted_value_hides_keys() {
        let text = "msg: \"first\n  port: 1\n  last\"\nport: 2\n";
        assert_eq!(find(text, "msg"), Some(LineRange::new(1, 3)));
        assert_eq!(find(text, "port"), Some(LineRange::single(4)));
    }

    #[test]
    fn test_anchor_on_nested_block() {
        let text = "base: &base\n  a: 1\n  b: 2\nother: 3\n";
        assert_eq!(find(text, "base"), Some(LineRange::new(1, 3)));
        assert_eq!(find(text, "base.b"), Some(LineRange::single(3)));
    }

    #[test]
    fn test_block_scalar_comment_lines_are_content() {
        let text = "script: |\n  # not a comment\n  echo hi\n  # trailing\nnext: 1\n";
        assert_eq!(find(text, "script"), Some(LineRange::new(1, 4)));
    }

    #[test]
    fn test_block_scalar_item() {
        let text = "steps:\n  - |\n    key: inside\n  - after\nkey: outside\n";
        assert_eq!(find(text, "steps.0"), Some(LineRange::new(2, 3)));
        assert_eq!(find(text, "steps.1"), Some(LineRange::single(4)));
        assert_eq!(find(text, "key"), Some(LineRange::single(5)));
    }

    #[test]
    fn test_top_level_sequence() {
        let text = "- name: a\n- name: b\n";
        assert_eq!(find(text, "1.name"), Some(LineRange::single(2)));
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        for text in ["::\n- - -\n  : x", "\"unclosed: 1\nkey: 2", "'\n'\n-\n[", "a: [\n"] {
            let _ = find(text, "a.b");
            let _ = find(text, "key");
        }
    }
}
