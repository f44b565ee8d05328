//! Startup diagnostic log.
//!
//! Usable before the main logging pipeline is wired up. Enabled only when the
//! sentinel file exists at construction; the decision is never revisited.
//!
//! # Sentinel Format
//! ```text
//! line 1: target file path, taken verbatim (empty → startup.log)
//! line 2: optional startup delay in milliseconds (non-numeric → 0)
//! ```
//!
//! The sentinel is `cdeenablestartuplog` in the process working directory.
//!
//! Every write is best-effort: failures are swallowed so that diagnosing the
//! boot sequence can never abort it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Sentinel file name, resolved against the process working directory.
pub const SENTINEL_FILE: &str = "cdeenablestartuplog";

/// Log file used when the sentinel's first line is empty.
pub const DEFAULT_LOG_FILE: &str = "startup.log";

/// Severity of a startup log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageLevel {
    Error,
    Warning,
    Important,
    #[default]
    Message,
    Debug,
    HostDebug,
}

/// Settings read from the sentinel file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartupLogConfig {
    /// Flat-file sink; `None` when the sentinel has no lines at all.
    pub target: Option<PathBuf>,
    /// How long the host waits before initializing.
    pub start_delay: Duration,
}

impl StartupLogConfig {
    /// Parse sentinel file content.
    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines();

        let Some(first) = lines.next() else {
            return Self::default();
        };

        let target = if first.is_empty() {
            PathBuf::from(DEFAULT_LOG_FILE)
        } else {
            PathBuf::from(first)
        };

        let delay_ms = lines
            .next()
            .and_then(|l| l.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Self {
            target: Some(target),
            start_delay: Duration::from_millis(delay_ms),
        }
    }
}

#[derive(Debug)]
struct Inner {
    config: StartupLogConfig,
}

/// Best-effort dual-sink logger for the boot window.
///
/// Cloning shares the same sinks. A disabled log turns every call into a no-op.
#[derive(Debug, Clone, Default)]
pub struct StartupLog {
    inner: Option<Arc<Inner>>,
}

impl StartupLog {
    /// A log that never writes anything.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// An enabled log with an explicit configuration.
    pub fn with_config(config: StartupLogConfig) -> Self {
        Self {
            inner: Some(Arc::new(Inner { config })),
        }
    }

    /// Look for the sentinel in the current working directory.
    pub fn detect() -> Self {
        Self::from_sentinel(Path::new(SENTINEL_FILE))
    }

    /// Build from an explicit sentinel path.
    ///
    /// A missing or unreadable sentinel yields a disabled log.
    pub fn from_sentinel(path: &Path) -> Self {
        if !path.is_file() {
            return Self::disabled();
        }
        match fs::read_to_string(path) {
            Ok(content) => Self::with_config(StartupLogConfig::parse(&content)),
            Err(_) => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Delay requested by the sentinel, zero when disabled.
    pub fn start_delay(&self) -> Duration {
        self.inner
            .as_ref()
            .map(|i| i.config.start_delay)
            .unwrap_or_default()
    }

    /// Log at [`MessageLevel::Message`].
    pub fn log(&self, text: impl AsRef<str>) {
        self.log_at(text, MessageLevel::Message);
    }

    /// Log to both sinks at the given level.
    pub fn log_at(&self, text: impl AsRef<str>, level: MessageLevel) {
        let Some(inner) = &self.inner else {
            return;
        };
        let text = text.as_ref();
        let time = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, false);

        match level {
            MessageLevel::Error => tracing::error!(target: "startup", %time, "{}", text),
            MessageLevel::Warning => tracing::warn!(target: "startup", %time, "{}", text),
            MessageLevel::Debug | MessageLevel::HostDebug => {
                tracing::debug!(target: "startup", %time, "{}", text)
            }
            _ => tracing::info!(target: "startup", %time, "{}", text),
        }

        if let Some(path) = &inner.config.target {
            append_line(path, &format!("{time}: {text}\n"));
        }
    }

    /// System-log adapter handed to the engine during boot.
    pub fn write_to_log(&self, log_id: i32, topic: &str, text: &str, level: MessageLevel) {
        self.log_at(format!("SYSLOG: ID:{log_id} Topic:{topic} {text}"), level);
    }
}

/// Append a line, reporting success without ever failing the caller.
fn append_line(path: &Path, line: &str) -> bool {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(line.as_bytes()))
        .is_ok()
}
