//! Effective settings handed to the engine at start.

use std::collections::BTreeMap;

use crate::config::source::ConfigSource;

/// Parse a setting value as a boolean flag.
///
/// `true`, `1`, `yes` and `on` (trimmed, any case) are true; anything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Mapping from setting name to string value.
///
/// Assembled once from the configuration source's immediate children. Only the
/// `update_arg_list` hook mutates it; the engine receives it by shared reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList {
    entries: BTreeMap<String, String>,
}

impl ArgList {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the immediate children of a configuration source.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        Self {
            entries: source.children().into_iter().collect(),
        }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert or overwrite a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// True when the key is present and parses as a true flag.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).map(parse_flag).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ArgList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
