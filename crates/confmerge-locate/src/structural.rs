//! Character-stream scanner shared by the JSON and JSON5 path finders.
//!
//! The scanner walks the text once, keeping a stack of open containers. Each
//! frame remembers the key that introduced it and, for arrays, how many
//! elements have started so far. When a key (or an array element) whose full
//! path equals the target is reached, the value that follows is classified
//! to find the line it ends on.
//!
//! Only structural bytes (`{}[]:,"'/` and whitespace) are inspected, so
//! multi-byte UTF-8 sequences pass through untouched.

use confmerge_source_map::LineRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Json,
    Json5,
}

impl Dialect {
    fn has_comments(self) -> bool {
        self == Dialect::Json5
    }

    fn is_quote(self, b: u8) -> bool {
        b == b'"' || (self == Dialect::Json5 && b == b'\'')
    }
}

#[derive(Debug)]
struct Frame {
    key: Option<String>,
    is_array: bool,
    /// Number of elements started so far (arrays only)
    started: usize,
}

/// Find the line range of the value at `target`.
pub(crate) fn find_line_range(text: &str, target: &[String], dialect: Dialect) -> Option<LineRange> {
    if target.is_empty() {
        return None;
    }
    let mut scanner = Scanner::new(text, dialect);
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending_key: Option<String> = None;

    while let Some(b) = scanner.peek() {
        if scanner.skip_noise() {
            continue;
        }

        match b {
            b'{' | b'[' => {
                let start = scanner.line;
                if start_element(&mut stack, target) {
                    let end = scanner.value_end_line();
                    return Some(LineRange::new(start, end));
                }
                stack.push(Frame {
                    key: pending_key.take(),
                    is_array: b == b'[',
                    started: 0,
                });
                scanner.pos += 1;
            }
            b'}' | b']' => {
                stack.pop();
                pending_key = None;
                scanner.pos += 1;
            }
            q if dialect.is_quote(q) => {
                let start = scanner.line;
                scanner.pos += 1;
                let token = scanner.read_string(q);
                let token_end = scanner.line;
                if let Some(range) =
                    scanner.key_or_value(token, start, token_end, &mut stack, &mut pending_key, target)
                {
                    return Some(range);
                }
            }
            _ if dialect == Dialect::Json5 && is_ident_start(b) => {
                let start = scanner.line;
                let token = scanner.read_identifier();
                if let Some(range) =
                    scanner.key_or_value(token, start, start, &mut stack, &mut pending_key, target)
                {
                    return Some(range);
                }
            }
            _ => {
                pending_key = None;
                if start_element(&mut stack, target) {
                    return Some(LineRange::single(scanner.line));
                }
                scanner.skip_scalar();
            }
        }
    }

    None
}

/// Count a new element in the enclosing array and report whether its path is the target.
fn start_element(stack: &mut [Frame], target: &[String]) -> bool {
    match stack.last_mut() {
        Some(frame) if frame.is_array => frame.started += 1,
        _ => return false,
    }
    path_equals(stack, None, target)
}

fn path_equals(stack: &[Frame], key: Option<&str>, target: &[String]) -> bool {
    let mut segments: Vec<String> = Vec::with_capacity(stack.len() * 2 + 1);
    for frame in stack {
        if let Some(k) = &frame.key {
            segments.push(k.clone());
        }
        if frame.is_array {
            segments.push(frame.started.saturating_sub(1).to_string());
        }
    }
    if let Some(k) = key {
        segments.push(k.to_string());
    }
    segments == target
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// 1-based line of `pos`
    line: usize,
    dialect: Dialect,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, dialect: Dialect) -> Self {
        Scanner {
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
            dialect,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Consume whitespace, commas and (JSON5) comments. Returns true if anything was consumed.
    fn skip_noise(&mut self) -> bool {
        let before = self.pos;
        loop {
            self.skip_trivia();
            if self.peek() == Some(b',') {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.pos != before
    }

    /// Consume whitespace and (JSON5) comments.
    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'/' if self.dialect.has_comments() && self.peek_at(1) == Some(b'/') => {
                    self.skip_line_comment();
                }
                b'/' if self.dialect.has_comments() && self.peek_at(1) == Some(b'*') => {
                    self.skip_block_comment();
                }
                _ => break,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while let Some(b) = self.peek() {
            if b == b'*' && self.peek_at(1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    /// Read a quoted string whose opening quote was already consumed.
    ///
    /// A backslash always takes the next byte literally; an escaped newline
    /// still advances the line counter.
    fn read_string(&mut self, quote: u8) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    match self.peek_at(1) {
                        Some(b'\n') => self.line += 1,
                        Some(b'\r') if self.peek_at(2) == Some(b'\n') => {
                            self.line += 1;
                            self.pos += 1;
                        }
                        _ => {}
                    }
                    self.pos += 2;
                }
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                _ if b == quote => {
                    let raw = &self.bytes[start..self.pos];
                    self.pos += 1;
                    return unescape(&String::from_utf8_lossy(raw));
                }
                _ => self.pos += 1,
            }
        }
        let end = self.pos.min(self.bytes.len());
        unescape(&String::from_utf8_lossy(&self.bytes[start..end]))
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    fn skip_scalar(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek() {
            let stop = matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b',' | b'}' | b']')
                || (b == b'/' && self.dialect.has_comments());
            if stop {
                break;
            }
            self.pos += 1;
        }
    }

    /// Decide whether the token just read is a key (followed by `:`) or a value.
    fn key_or_value(
        &mut self,
        token: String,
        start: usize,
        token_end: usize,
        stack: &mut [Frame],
        pending_key: &mut Option<String>,
        target: &[String],
    ) -> Option<LineRange> {
        self.skip_trivia();
        if self.peek() == Some(b':') {
            if path_equals(stack, Some(&token), target) {
                self.pos += 1;
                let end = self.value_end_line();
                return Some(LineRange::new(start, end));
            }
            *pending_key = Some(token);
            self.pos += 1;
            return None;
        }

        *pending_key = None;
        if start_element(stack, target) {
            return Some(LineRange::new(start, token_end));
        }
        None
    }

    /// Classify the value starting at the cursor and return the line it ends on.
    fn value_end_line(&mut self) -> usize {
        self.skip_trivia();
        match self.peek() {
            Some(q) if self.dialect.is_quote(q) => {
                self.pos += 1;
                self.read_string(q);
                self.line
            }
            Some(b'{' | b'[') => self.container_end_line(),
            _ => self.line,
        }
    }

    /// Bracket-depth scan from an opening bracket to its partner.
    ///
    /// Brackets inside strings and comments do not count. Unbalanced input
    /// ends at the last line reached.
    fn container_end_line(&mut self) -> usize {
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' | b'[' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' | b']' => {
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                    if depth == 0 {
                        return self.line;
                    }
                }
                q if self.dialect.is_quote(q) => {
                    self.pos += 1;
                    self.read_string(q);
                }
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b'/' if self.dialect.has_comments()
                    && matches!(self.peek_at(1), Some(b'/' | b'*')) =>
                {
                    self.skip_trivia();
                }
                _ => self.pos += 1,
            }
        }
        self.line
    }
}

/// Decode the common escapes so quoted keys compare by their logical value.
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some('\n' | '\r') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
