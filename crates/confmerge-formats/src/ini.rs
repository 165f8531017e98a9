//! INI files with configparser semantics.
//!
//! - `[a.b]` sections nest as `{a: {b: ...}}`
//! - option names are lower-cased, section names are not
//! - `=` or `:` separates a key from its value, whichever comes first
//! - deeper-indented lines continue the previous value, joined with `\n`;
//!   blank lines between them stay in the value, trailing ones do not
//! - full-line `#` and `;` comments
//! - keys in `[DEFAULT]` appear under `DEFAULT` and are inherited by every section

use confmerge_config::ConfigValue;
use confmerge_source_map::SourceKind;
use indexmap::IndexMap;

use crate::{FormatError, coerce_scalar};

const DEFAULT_SECTION: &str = "DEFAULT";

type Options = IndexMap<String, String>;

struct OpenOption {
    key: String,
    indent: usize,
    /// Blank lines seen since the last line of the value
    blank_lines: usize,
}

pub fn parse_ini(text: &str) -> Result<ConfigValue, FormatError> {
    let mut defaults = Options::new();
    let mut sections: IndexMap<String, Options> = IndexMap::new();
    let mut current: Option<String> = None;
    let mut open: Option<OpenOption> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();
        let indent = raw.len() - raw.trim_start().len();

        if trimmed.is_empty() {
            if let Some(option) = open.as_mut() {
                option.blank_lines += 1;
            }
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(option) = open.as_mut().filter(|o| indent > o.indent) {
            let target = match current.as_deref() {
                Some(DEFAULT_SECTION) => &mut defaults,
                Some(name) => sections.entry(name.to_string()).or_default(),
                None => continue,
            };
            if let Some(value) = target.get_mut(&option.key) {
                if !value.is_empty() {
                    value.push('\n');
                }
                for _ in 0..option.blank_lines {
                    value.push('\n');
                }
                value.push_str(trimmed);
            }
            option.blank_lines = 0;
            continue;
        }
        open = None;

        if let Some(name) = section_header(trimmed) {
            if name != DEFAULT_SECTION && sections.contains_key(name) {
                return Err(error(line_no, format!("section '{name}' already exists")));
            }
            if name != DEFAULT_SECTION {
                sections.insert(name.to_string(), Options::new());
            }
            current = Some(name.to_string());
            continue;
        }

        let Some(section) = current.as_deref() else {
            return Err(error(line_no, "file contains no section headers"));
        };
        let Some(split) = trimmed.find(['=', ':']) else {
            return Err(error(line_no, format!("expected 'key = value', got '{trimmed}'")));
        };
        let key = trimmed[..split].trim().to_lowercase();
        let value = trimmed[split + 1..].trim().to_string();
        if key.is_empty() {
            return Err(error(line_no, "option name is empty"));
        }

        let target = if section == DEFAULT_SECTION {
            &mut defaults
        } else {
            sections.entry(section.to_string()).or_default()
        };
        if target.contains_key(&key) {
            return Err(error(
                line_no,
                format!("option '{key}' in section '{section}' already exists"),
            ));
        }
        target.insert(key.clone(), value);
        open = Some(OpenOption {
            key,
            indent,
            blank_lines: 0,
        });
    }

    Ok(build_tree(defaults, sections))
}

fn section_header(line: &str) -> Option<&str> {
    let name = line.strip_prefix('[')?.strip_suffix(']')?;
    (!name.is_empty()).then_some(name)
}

fn error(line: usize, message: impl std::fmt::Display) -> FormatError {
    FormatError::parse(SourceKind::Ini, format!("line {line}: {message}"))
}

fn options_value(options: &Options, defaults: &Options) -> IndexMap<String, ConfigValue> {
    let mut entries: IndexMap<String, ConfigValue> = options
        .iter()
        .map(|(k, v)| (k.clone(), coerce_scalar(v)))
        .collect();
    for (key, value) in defaults {
        if !entries.contains_key(key) {
            entries.insert(key.clone(), coerce_scalar(value));
        }
    }
    entries
}

fn build_tree(defaults: Options, sections: IndexMap<String, Options>) -> ConfigValue {
    let mut root: IndexMap<String, ConfigValue> = IndexMap::new();
    if !defaults.is_empty() {
        root.insert(
            DEFAULT_SECTION.to_string(),
            ConfigValue::Map(options_value(&defaults, &Options::new())),
        );
    }

    for (name, options) in &sections {
        let mut target = &mut root;
        let mut parts: Vec<&str> = name.split('.').collect();
        let last = parts.pop().unwrap_or(name);
        for part in parts {
            target = target
                .entry(part.to_string())
                .or_insert_with(ConfigValue::empty_map)
                .force_map();
        }

        let values = options_value(options, &defaults);
        match target.get_mut(last) {
            Some(ConfigValue::Map(existing)) => {
                // A nested section such as [a.b] may have been seen before [a].
                for (key, value) in values {
                    existing.entry(key).or_insert(value);
                }
            }
            _ => {
                target.insert(last.to_string(), ConfigValue::Map(values));
            }
        }
    }

    ConfigValue::Map(root)
}
