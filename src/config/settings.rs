//! Layered settings lookup.
//!
//! # Lookup Order
//! ```text
//! has_setting:                base store → configuration source (non-empty)
//! get_setting/get_app_setting: configuration source (non-empty) → base store
//! ```
//!
//! The two orders differ and both are load-bearing: a key can be "present"
//! through the base store while its value is served by the configuration source.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::source::ConfigSource;

/// A settings store the host and engine can query.
pub trait SettingsStore: Send + Sync {
    fn has_setting(&self, name: &str) -> bool;

    fn get_setting(&self, name: &str) -> Option<String>;

    /// Get a setting, or `fallback` when it is absent.
    ///
    /// `is_encrypted` marks values stored in protected form; stores that keep
    /// plain values ignore it.
    fn get_app_setting(&self, name: &str, fallback: &str, is_encrypted: bool) -> String;
}

/// In-memory base settings store.
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct BaseSettings {
    values: HashMap<String, String>,
}

impl BaseSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BaseSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl SettingsStore for BaseSettings {
    fn has_setting(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn get_setting(&self, name: &str) -> Option<String> {
        self.lookup(name).map(str::to_string)
    }

    fn get_app_setting(&self, name: &str, fallback: &str, _is_encrypted: bool) -> String {
        self.lookup(name).unwrap_or(fallback).to_string()
    }
}

/// Settings resolver layering a configuration source over a base store.
#[derive(Clone)]
pub struct LayeredSettings {
    source: Arc<dyn ConfigSource>,
    base: Arc<dyn SettingsStore>,
}

impl LayeredSettings {
    pub fn new(source: Arc<dyn ConfigSource>, base: Arc<dyn SettingsStore>) -> Self {
        Self { source, base }
    }

    /// Read a setting through the resolver and parse it as a flag.
    pub fn flag(&self, name: &str) -> bool {
        self.get_setting(name)
            .map(|v| crate::config::args::parse_flag(&v))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for LayeredSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredSettings").finish_non_exhaustive()
    }
}

impl SettingsStore for LayeredSettings {
    fn has_setting(&self, name: &str) -> bool {
        if self.base.has_setting(name) {
            return true;
        }
        self.source.non_empty(name).is_some()
    }

    fn get_setting(&self, name: &str) -> Option<String> {
        if let Some(value) = self.source.non_empty(name) {
            return Some(value);
        }
        self.base.get_setting(name)
    }

    fn get_app_setting(&self, name: &str, fallback: &str, is_encrypted: bool) -> String {
        if let Some(value) = self.source.non_empty(name) {
            return value;
        }
        self.base.get_app_setting(name, fallback, is_encrypted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source::MemoryConfigSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Base store that counts how often the source was bypassed.
    struct CountingStore {
        inner: BaseSettings,
        has_calls: AtomicUsize,
        get_calls: AtomicUsize,
    }

    impl SettingsStore for CountingStore {
        fn has_setting(&self, name: &str) -> bool {
            self.has_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.has_setting(name)
        }

        fn get_setting(&self, name: &str) -> Option<String> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_setting(name)
        }

        fn get_app_setting(&self, name: &str, fallback: &str, is_encrypted: bool) -> String {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_app_setting(name, fallback, is_encrypted)
        }
    }

    fn resolver(source: &[(&str, &str)], base: &[(&str, &str)]) -> LayeredSettings {
        let source: MemoryConfigSource = source.iter().copied().collect();
        let base: BaseSettings = base.iter().copied().collect();
        LayeredSettings::new(Arc::new(source), Arc::new(base))
    }

    #[test]
    fn test_has_setting_either_layer() {
        let settings = resolver(&[("OnlySource", "1")], &[("OnlyBase", "2")]);
        assert!(settings.has_setting("OnlySource"));
        assert!(settings.has_setting("OnlyBase"));
        assert!(!settings.has_setting("Neither"));
    }

    #[test]
    fn test_has_setting_checks_base_first() {
        let base = Arc::new(CountingStore {
            inner: [("Shared", "base")].into_iter().collect(),
            has_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        });
        let source: MemoryConfigSource = [("Shared", "source")].into_iter().collect();
        let settings = LayeredSettings::new(Arc::new(source), base.clone());

        assert!(settings.has_setting("Shared"));
        assert_eq!(base.has_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_setting_prefers_source() {
        let settings = resolver(&[("Shared", "source")], &[("Shared", "base")]);
        assert_eq!(settings.get_setting("Shared").as_deref(), Some("source"));
        assert_eq!(settings.get_app_setting("Shared", "alt", false), "source");
    }

    #[test]
    fn test_get_setting_falls_back_to_base() {
        let settings = resolver(&[("Blank", "")], &[("Blank", "base"), ("Other", "x")]);
        assert_eq!(settings.get_setting("Blank").as_deref(), Some("base"));
        assert_eq!(settings.get_setting("Other").as_deref(), Some("x"));
        assert!(settings.get_setting("Missing").is_none());
    }

    #[test]
    fn test_get_app_setting_fallback() {
        let settings = resolver(&[], &[]);
        assert_eq!(settings.get_app_setting("Missing", "alt", true), "alt");
    }

    #[test]
    fn test_source_hit_skips_base_lookup() {
        let base = Arc::new(CountingStore {
            inner: BaseSettings::new(),
            has_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        });
        let source: MemoryConfigSource = [("Key", "v")].into_iter().collect();
        let settings = LayeredSettings::new(Arc::new(source), base.clone());

        assert_eq!(settings.get_setting("Key").as_deref(), Some("v"));
        assert_eq!(settings.get_app_setting("Key", "", false), "v");
        assert_eq!(base.get_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flag_reads_through_resolver() {
        let settings = resolver(&[("UseRandomScope", "true")], &[("UseRandomDeviceID", "1")]);
        assert!(settings.flag("UseRandomScope"));
        assert!(settings.flag("UseRandomDeviceID"));
        assert!(!settings.flag("DisableConsole"));
    }
}
