//! Shared driver and helpers for the line-oriented path finders.

use confmerge_source_map::LineRange;

/// One format's "look at this physical line" step.
///
/// Implementations keep whatever state they need between lines (current
/// section, indentation stack, open multi-line value) and return a range
/// once the line defining the target path is reached.
pub(crate) trait LineScanner {
    /// `index` is 0-based into `lines`; returned ranges are 1-based.
    fn process_line(&mut self, lines: &[&str], index: usize, target: &[String]) -> Option<LineRange>;
}

/// Run `scanner` over every physical line of `text` until it reports a match.
pub(crate) fn scan_lines<S: LineScanner>(mut scanner: S, text: &str, target: &[String]) -> Option<LineRange> {
    if target.is_empty() {
        return None;
    }
    let lines: Vec<&str> = text.lines().collect();
    (0..lines.len()).find_map(|index| scanner.process_line(&lines, index, target))
}

/// Count of leading spaces and tabs.
pub(crate) fn indent_of(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Tracks `{[`/`}]` nesting across lines, ignoring brackets inside quoted
/// substrings and after a `#` comment.
#[derive(Debug, Default, Clone)]
pub(crate) struct BracketDepth {
    depth: usize,
    in_string: Option<u8>,
    escaped: bool,
}

impl BracketDepth {
    pub(crate) fn feed(&mut self, text: &str) {
        for b in text.bytes() {
            if let Some(quote) = self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' && quote == b'"' {
                    self.escaped = true;
                } else if b == quote {
                    self.in_string = None;
                }
                continue;
            }
            match b {
                b'"' | b'\'' => self.in_string = Some(b),
                b'#' => break,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    /// Whether a bracket or a quoted string is still unclosed.
    pub(crate) fn is_open(&self) -> bool {
        self.depth > 0 || self.in_string.is_some()
    }
}

/// Feed the following lines into `state` until it closes; returns the 1-based closing line.
///
/// An unclosed value runs to the last line.
pub(crate) fn closing_line(lines: &[&str], index: usize, mut state: BracketDepth) -> usize {
    for (offset, line) in lines.iter().enumerate().skip(index + 1) {
        state.feed(line);
        if !state.is_open() {
            return offset + 1;
        }
    }
    lines.len().max(index + 1)
}

/// Byte position of the first `needle` outside single or double quotes.
pub(crate) fn find_unquoted(text: &str, needle: u8) -> Option<usize> {
    let mut in_string: Option<u8> = None;
    let mut escaped = false;
    for (pos, b) in text.bytes().enumerate() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' && quote == b'"' {
                escaped = true;
            } else if b == quote {
                in_string = None;
            }
            continue;
        }
        if b == needle {
            return Some(pos);
        }
        if b == b'"' || b == b'\'' {
            in_string = Some(b);
        }
    }
    None
}

/// Strip one layer of matching single or double quotes.
pub(crate) fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Split `a."b.c".d` into `["a", "b.c", "d"]`.
pub(crate) fn split_dotted_key(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(dot) = find_unquoted(rest, b'.') {
        parts.push(unquote(rest[..dot].trim()).to_string());
        rest = &rest[dot + 1..];
    }
    parts.push(unquote(rest.trim()).to_string());
    parts
}
