//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::source::MemoryConfigSource;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// A `key=value` override without `=` or with an empty key.
    InvalidOverride(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidOverride(raw) => {
                write!(f, "Invalid override '{}': expected key=value", raw)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load a TOML configuration file into a configuration source.
///
/// Only top-level scalar keys are immediate children; tables and arrays are skipped.
pub fn load_config(path: &Path) -> Result<MemoryConfigSource, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let source = parse_config(&content)?;

    tracing::debug!(path = ?path, keys = source.len(), "Configuration file loaded");
    Ok(source)
}

/// Parse TOML text into a configuration source.
pub fn parse_config(content: &str) -> Result<MemoryConfigSource, ConfigError> {
    let table: toml::Table = content.parse().map_err(ConfigError::Parse)?;

    let mut source = MemoryConfigSource::new();
    for (key, value) in table {
        if let Some(text) = scalar_to_string(&value) {
            source.insert(key, text);
        }
    }
    Ok(source)
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Parse `key=value` overrides (as given on the command line).
pub fn parse_overrides<S: AsRef<str>>(raw: &[S]) -> Result<Vec<(String, String)>, ConfigError> {
    raw.iter()
        .map(|item| {
            let item = item.as_ref();
            match item.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    Ok((key.trim().to_string(), value.to_string()))
                }
                _ => Err(ConfigError::InvalidOverride(item.to_string())),
            }
        })
        .collect()
}
