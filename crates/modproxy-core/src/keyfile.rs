//! Line-oriented key-file parser.
//!
//! Descriptor files and the workspace configuration payload use the same
//! grouped `key=value` dialect:
//!
//! ```text
//! # comment
//! [group]
//! name=Plain value
//! name[de]=Lokalisierter Wert
//! configurable=true
//! ```
//!
//! Later duplicates of a key override earlier ones; a repeated group header
//! continues the existing group.

use std::path::Path;

use thiserror::Error;

/// Errors raised while reading or parsing a key file.
#[derive(Debug, Error)]
pub enum KeyFileError {
    /// The file could not be read.
    #[error("failed to read key file: {0}")]
    Io(#[from] std::io::Error),
    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Group {
    name: String,
    entries: Vec<(String, String)>,
}

/// A parsed key file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFile {
    groups: Vec<Group>,
}

impl KeyFile {
    /// Creates an empty key file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, KeyFileError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses key-file text.
    pub fn parse(text: &str) -> Result<Self, KeyFileError> {
        let mut keyfile = Self::new();
        let mut current: Option<usize> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| KeyFileError::Syntax {
                    line: line_no,
                    message: "unterminated group header".to_string(),
                })?;
                if name.is_empty() || name.contains('[') || name.contains(']') {
                    return Err(KeyFileError::Syntax {
                        line: line_no,
                        message: format!("invalid group name '{name}'"),
                    });
                }
                current = Some(keyfile.group_index_or_insert(name));
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| KeyFileError::Syntax {
                line: line_no,
                message: "expected 'key=value', a group header, or a comment".to_string(),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(KeyFileError::Syntax {
                    line: line_no,
                    message: "empty key".to_string(),
                });
            }

            let group = current.ok_or_else(|| KeyFileError::Syntax {
                line: line_no,
                message: format!("key '{key}' appears before any group"),
            })?;

            keyfile.groups[group].set(key, unescape(value.trim()));
        }

        Ok(keyfile)
    }

    /// Returns whether the group exists.
    pub fn has_group(&self, group: &str) -> bool {
        self.group(group).is_some()
    }

    /// Returns whether the group holds the (unlocalized) key.
    pub fn has_key(&self, group: &str, key: &str) -> bool {
        self.string(group, key).is_some()
    }

    /// Returns group names in file order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Returns the keys of a group in file order, localized keys included.
    pub fn keys(&self, group: &str) -> Vec<&str> {
        self.group(group)
            .map(|g| g.entries.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }

    /// Returns the raw string value of a key.
    pub fn string(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the best localized value of a key for `locale`.
    ///
    /// For `ll_CC@mod` the lookup order is `key[ll_CC@mod]`, `key[ll_CC]`,
    /// `key[ll@mod]`, `key[ll]`, then the plain `key`.
    pub fn locale_string(&self, group: &str, key: &str, locale: Option<&str>) -> Option<&str> {
        if let Some(locale) = locale {
            for variant in locale_variants(locale) {
                if let Some(value) = self.string(group, &format!("{key}[{variant}]")) {
                    return Some(value);
                }
            }
        }
        self.string(group, key)
    }

    /// Returns a boolean value. `None` if missing or not a boolean.
    pub fn boolean(&self, group: &str, key: &str) -> Option<bool> {
        match self.string(group, key)? {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// Returns an integer value. `None` if missing or not an integer.
    pub fn integer(&self, group: &str, key: &str) -> Option<i64> {
        self.string(group, key)?.parse().ok()
    }

    /// Returns a `;`-separated list value.
    pub fn string_list(&self, group: &str, key: &str) -> Option<Vec<String>> {
        let raw = self.string(group, key)?;
        Some(
            raw.split(';')
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Sets a value, creating the group if needed.
    pub fn set_string(&mut self, group: &str, key: &str, value: impl Into<String>) {
        let index = self.group_index_or_insert(group);
        self.groups[index].set(key, value.into());
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    fn group_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(index) = self.groups.iter().position(|g| g.name == name) {
            return index;
        }
        self.groups.push(Group {
            name: name.to_string(),
            entries: Vec::new(),
        });
        self.groups.len() - 1
    }
}

impl Group {
    fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

fn locale_variants(locale: &str) -> Vec<String> {
    let (base, modifier) = match locale.split_once('@') {
        Some((base, modifier)) => (base, Some(modifier)),
        None => (locale, None),
    };
    let language = base.split('_').next().unwrap_or(base);
    let has_country = language != base;

    let mut variants = Vec::with_capacity(4);
    if let Some(modifier) = modifier {
        variants.push(format!("{base}@{modifier}"));
    }
    if has_country {
        variants.push(base.to_string());
    }
    if let Some(modifier) = modifier.filter(|_| has_country) {
        variants.push(format!("{language}@{modifier}"));
    }
    variants.push(language.to_string());
    variants
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
