//! Engine boot contract.
//!
//! The engine (security, scope management, device identity, networking) is an
//! external collaborator. The host only drives it through [`Engine`] and reads
//! its keep-running state through [`MasterSwitch`].
//!
//! # Boot Order
//! ```text
//! load_crypto → set_application_id → [generate_scope_id → apply_scope_id]
//!     → start → ... → shutdown
//! ```

pub mod standalone;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::ArgList;
use crate::observability::{MessageLevel, StartupLog};
use crate::service::HostMetadata;

pub use standalone::StandaloneEngine;

/// Errors reported by an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Security subsystem could not be loaded.
    #[error("Security initialization failed: {0}")]
    Crypto(String),

    /// Engine start raised a fault.
    #[error("Engine start failed: {0}")]
    Start(String),
}

/// Options for loading the security subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CryptoOptions {
    pub dont_verify_trust: bool,
    pub verify_trust_path: bool,
    pub dont_verify_integrity: bool,
}

impl CryptoOptions {
    /// Derive options from the effective settings.
    pub fn from_args(args: &ArgList) -> Self {
        use crate::config::keys;

        Self {
            dont_verify_trust: args.flag(keys::DONT_VERIFY_TRUST),
            verify_trust_path: args.flag(keys::VERIFY_TRUST_PATH),
            dont_verify_integrity: args.flag(keys::DONT_VERIFY_INTEGRITY),
        }
    }
}

/// An entry from the engine's own system log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLogEntry {
    pub event_id: i64,
    pub serial: u64,
    pub message: String,
    pub level: MessageLevel,
}

/// The boot contract the host consumes.
///
/// All calls are synchronous and may block; the host imposes no timeout.
pub trait Engine: Send + Sync {
    /// Load the security subsystem.
    fn load_crypto(&self, options: &CryptoOptions, log: &StartupLog) -> Result<(), EngineError>;

    /// Register the application identity. Returns false if the id is illegal.
    fn set_application_id(&self, application_id: &str) -> bool;

    /// Create a fresh scope identifier.
    fn generate_scope_id(&self) -> String;

    /// Switch the engine to the given scope.
    fn apply_scope_id(&self, scope_id: &str);

    /// Start the engine with frozen metadata and settings.
    fn start(&self, metadata: &HostMetadata, settings: &ArgList) -> Result<bool, EngineError>;

    /// Ask the engine to shut down.
    fn shutdown(&self, force_immediate: bool, is_planned_stop: bool);

    /// Files the engine itself contributes to an application manifest.
    fn core_manifest(&self) -> Vec<String> {
        Vec::new()
    }

    /// Subscribe to the engine's system log, if it publishes one.
    fn system_log(&self) -> Option<broadcast::Receiver<EngineLogEntry>> {
        None
    }
}

/// Process-wide keep-running flag shared between host and engine.
///
/// The engine owns turning it off; the host only reads it and waits on it.
#[derive(Debug, Clone)]
pub struct MasterSwitch {
    on: Arc<AtomicBool>,
    off: CancellationToken,
}

impl MasterSwitch {
    /// A switch that starts in the "on" position.
    pub fn new() -> Self {
        Self {
            on: Arc::new(AtomicBool::new(true)),
            off: CancellationToken::new(),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    /// Turn the switch off and wake every waiter.
    pub fn turn_off(&self) {
        self.on.store(false, Ordering::SeqCst);
        self.off.cancel();
    }

    /// Wait until the switch is turned off.
    pub async fn wait_off(&self) {
        self.off.cancelled().await;
    }
}

impl Default for MasterSwitch {
    fn default() -> Self {
        Self::new()
    }
}
