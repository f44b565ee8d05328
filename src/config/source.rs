//! External configuration source.

use std::collections::BTreeMap;

/// A read-only configuration source the host consults for settings.
pub trait ConfigSource: Send + Sync {
    /// Look up a single value. Empty strings are returned as-is.
    fn value(&self, key: &str) -> Option<String>;

    /// The immediate key/value children of the source.
    fn children(&self) -> Vec<(String, String)>;

    /// Look up a value, treating empty strings as absent.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.value(key).filter(|v| !v.is_empty())
    }
}

/// In-memory configuration source.
///
/// Produced by the TOML loader and used directly in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigSource {
    values: BTreeMap<String, String>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Layer another set of values over this one.
    pub fn merge<K, V, I>(&mut self, overrides: I)
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in overrides {
            self.insert(k, v);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for MemoryConfigSource {
    fn value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn children(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryConfigSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();
        source.merge(iter);
        source
    }
}
