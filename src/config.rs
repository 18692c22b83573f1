//! Configuration properties
//!
//! Loads `key=value` property files. Later files override earlier ones, and
//! a file that is missing or unreadable is logged and skipped.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, warn};

/// An ordered set of string properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    properties: IndexMap<String, String>,
}

impl Config {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and merge property files, in order
    pub fn load<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        let mut config = Self::new();
        for path in paths {
            let path = path.as_ref();
            if path.as_os_str().is_empty() {
                continue;
            }
            if !path.exists() {
                debug!(path = %path.display(), "Cannot load properties file");
                continue;
            }
            match std::fs::read_to_string(path)
                .map_err(Error::from)
                .and_then(|text| Self::parse(&text))
            {
                Ok(loaded) => config.merge(loaded),
                Err(e) => warn!(path = %path.display(), error = %e, "Error loading properties"),
            }
        }
        config
    }

    /// Parse property text.
    ///
    /// Accepts `key=value`, `key: value` and `key value`. Lines starting
    /// with `#` or `!` are comments, and an unescaped trailing backslash
    /// continues a line. Keys and values are unescaped: `\t`, `\n`, `\r`,
    /// `\f` and `\uXXXX` decode, and any other escaped character stands
    /// for itself.
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = Self::new();
        let mut pending = String::new();

        for raw in text.lines() {
            let line = raw.trim_start();
            if pending.is_empty() && is_blank_or_comment(line) {
                continue;
            }

            let trailing = line.len() - line.trim_end_matches('\\').len();
            if trailing % 2 == 1 {
                pending.push_str(&line[..line.len() - 1]);
                continue;
            }
            pending.push_str(line);
            config.put_entry(&pending)?;
            pending.clear();
        }

        if !pending.is_empty() {
            config.put_entry(&pending)?;
        }
        Ok(config)
    }

    fn put_entry(&mut self, line: &str) -> Result<()> {
        let (key, value) = split_entry(line);
        let key = unescape(key)?;
        if !key.is_empty() {
            self.put(key, unescape(value)?);
        }
        Ok(())
    }

    /// Set a property
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Copy every property of `other` over this config
    pub fn merge(&mut self, other: Config) {
        self.properties.extend(other.properties);
    }

    /// Get a property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Get a property, or `default` when absent
    pub fn get_string_value<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Get a property as a boolean; absent means false
    pub fn get_boolean_value(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Get a property as an integer
    pub fn get_integer_value(&self, key: &str) -> Result<i32> {
        let value = self
            .get(key)
            .ok_or_else(|| Error::Config(format!("property '{}' is not set", key)))?;
        value.trim().parse().map_err(|_| {
            Error::Config(format!("property '{}' is not an integer: '{}'", key, value))
        })
    }

    /// Properties whose keys start with `prefix.`, with the prefix removed
    pub fn partition(&self, prefix: &str) -> Config {
        if prefix.is_empty() {
            return self.clone();
        }
        let dotted = format!("{}.", prefix);
        let properties = self
            .properties
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&dotted).map(|k| (k.to_string(), v.clone())))
            .collect();
        Config { properties }
    }

    /// All properties in load order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether there are no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

fn is_blank_or_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with('!')
}

/// Split a logical line at the first unescaped separator
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            end = i;
            break;
        }
    }

    let key = &line[..end];
    let rest = line[end..].trim_start();
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (key, rest.trim_start())
}

fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = Some(hex.as_str())
                    .filter(|h| h.len() == 4 && h.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        Error::Config(format!("malformed \\uXXXX escape in '{}'", raw))
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
