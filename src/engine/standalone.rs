//! Minimal in-process engine used by the `worker-host` binary.
//!
//! It performs no networking: it validates the boot calls, publishes a few
//! system-log entries and turns the master switch off on shutdown.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use rand::Rng;
use tokio::sync::broadcast;

use crate::config::ArgList;
use crate::engine::{CryptoOptions, Engine, EngineError, EngineLogEntry, MasterSwitch};
use crate::observability::{MessageLevel, StartupLog};
use crate::service::HostMetadata;

/// Alphabet for human-typeable scope ids (no 0/O/1/I).
const SCOPE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";
const SCOPE_ID_LEN: usize = 8;

pub struct StandaloneEngine {
    master: MasterSwitch,
    application_id: Mutex<Option<String>>,
    scope_id: Mutex<Option<String>>,
    started: AtomicBool,
    serial: AtomicU64,
    log_tx: broadcast::Sender<EngineLogEntry>,
}

impl StandaloneEngine {
    pub fn new(master: MasterSwitch) -> Self {
        let (log_tx, _) = broadcast::channel(64);
        Self {
            master,
            application_id: Mutex::new(None),
            scope_id: Mutex::new(None),
            started: AtomicBool::new(false),
            serial: AtomicU64::new(0),
            log_tx,
        }
    }

    /// Scope currently applied, if any.
    pub fn scope_id(&self) -> Option<String> {
        self.scope_id.lock().expect("scope mutex poisoned").clone()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn publish(&self, event_id: i64, message: String, level: MessageLevel) {
        let serial = self.serial.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(event_id, serial, %message, "Engine event");
        // No subscribers is fine
        let _ = self.log_tx.send(EngineLogEntry {
            event_id,
            serial,
            message,
            level,
        });
    }
}

impl Engine for StandaloneEngine {
    fn load_crypto(&self, options: &CryptoOptions, log: &StartupLog) -> Result<(), EngineError> {
        log.write_to_log(
            1,
            "Security",
            &format!(
                "In-process security provider (verify trust: {}, verify integrity: {})",
                !options.dont_verify_trust, !options.dont_verify_integrity
            ),
            MessageLevel::Debug,
        );
        Ok(())
    }

    fn set_application_id(&self, application_id: &str) -> bool {
        if application_id.trim().is_empty() {
            return false;
        }
        *self.application_id.lock().expect("application id mutex poisoned") =
            Some(application_id.to_string());
        true
    }

    fn generate_scope_id(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..SCOPE_ID_LEN)
            .map(|_| SCOPE_ALPHABET[rng.gen_range(0..SCOPE_ALPHABET.len())] as char)
            .collect()
    }

    fn apply_scope_id(&self, scope_id: &str) {
        *self.scope_id.lock().expect("scope mutex poisoned") = Some(scope_id.to_string());
        self.publish(2, format!("Scope set to {scope_id}"), MessageLevel::Important);
    }

    fn start(&self, metadata: &HostMetadata, settings: &ArgList) -> Result<bool, EngineError> {
        if self
            .application_id
            .lock()
            .expect("application id mutex poisoned")
            .is_none()
        {
            return Err(EngineError::Start("application id not set".into()));
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(true);
        }
        self.publish(
            3,
            format!(
                "{} started with {} settings",
                metadata.application_name,
                settings.len()
            ),
            MessageLevel::Message,
        );
        Ok(true)
    }

    fn shutdown(&self, force_immediate: bool, is_planned_stop: bool) {
        if self.started.swap(false, Ordering::SeqCst) {
            self.publish(
                4,
                format!("Shutdown (force: {force_immediate}, planned: {is_planned_stop})"),
                MessageLevel::Message,
            );
        }
        self.master.turn_off();
    }

    fn system_log(&self) -> Option<broadcast::Receiver<EngineLogEntry>> {
        Some(self.log_tx.subscribe())
    }
}
