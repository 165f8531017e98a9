//! INI path finder.
//!
//! Follows the Python `configparser` reading rules: `[a.b]` section headers,
//! `key = value` or `key: value` entries, full-line `#`/`;` comments, and
//! continuation lines indented deeper than the key line they extend.
//! Keys compare case-insensitively because the loader lower-cases them.

use crate::lines::{LineScanner, indent_of, is_blank, unquote};
use confmerge_source_map::LineRange;

#[derive(Debug, Default)]
pub(crate) struct IniScanner {
    section: Vec<String>,
    /// Indentation of the most recent key line in the current section
    key_indent: Option<usize>,
}

impl LineScanner for IniScanner {
    fn process_line(&mut self, lines: &[&str], index: usize, target: &[String]) -> Option<LineRange> {
        let line = lines[index];
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            return None;
        }

        let indent = indent_of(line);
        if self.key_indent.is_some_and(|key_indent| indent > key_indent) {
            return None;
        }

        if let Some(name) = section_name(trimmed) {
            self.section = name.split('.').map(|part| part.trim().to_string()).collect();
            self.key_indent = None;
            if self.section == target {
                return Some(LineRange::new(index + 1, section_end(lines, index)));
            }
            return None;
        }

        let separator = trimmed.find(['=', ':'])?;
        let key = unquote(trimmed[..separator].trim());
        self.key_indent = Some(indent);

        if self.key_matches(key, target) {
            return Some(LineRange::new(index + 1, continuation_end(lines, index, indent)));
        }
        None
    }
}

impl IniScanner {
    fn key_matches(&self, key: &str, target: &[String]) -> bool {
        let Some((target_key, target_section)) = target.split_last() else {
            return false;
        };
        target_section == self.section.as_slice() && target_key.to_lowercase() == key.to_lowercase()
    }
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#') || trimmed.starts_with(';')
}

fn section_name(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_prefix('[')?;
    let close = inner.rfind(']')?;
    Some(inner[..close].trim())
}

/// Last line of a value whose continuation lines are indented deeper than `indent`.
fn continuation_end(lines: &[&str], index: usize, indent: usize) -> usize {
    let mut end = index + 1;
    for (offset, line) in lines.iter().enumerate().skip(index + 1) {
        if is_blank(line) || is_comment(line.trim()) {
            continue;
        }
        if indent_of(line) <= indent {
            break;
        }
        end = offset + 1;
    }
    end
}

/// Last content line before the next section header.
fn section_end(lines: &[&str], index: usize) -> usize {
    let mut end = index + 1;
    for (offset, line) in lines.iter().enumerate().skip(index + 1) {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }
        if indent_of(line) == 0 && section_name(trimmed).is_some() {
            break;
        }
        end = offset + 1;
    }
    end
}
