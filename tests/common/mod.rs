//! Shared utilities for host integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use worker_host::config::ArgList;
use worker_host::engine::{CryptoOptions, Engine, EngineError, EngineLogEntry, MasterSwitch};
use worker_host::lifecycle::{LifecycleState, ServiceHost};
use worker_host::observability::startup_log::SENTINEL_FILE;
use worker_host::observability::{MessageLevel, StartupLog};
use worker_host::service::{ExtensionHooks, HostMetadata};

/// How the mock engine answers `start`.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    Success,
    Refuse,
    Fault(String),
}

/// Scriptable engine that records every boot call.
pub struct MockEngine {
    master: MasterSwitch,
    crypto_failure: Option<String>,
    accept_application_id: bool,
    outcome: StartOutcome,
    core_manifest: Vec<String>,
    crypto_delay: Option<Duration>,
    scope_delay: Option<Duration>,
    calls: Mutex<Vec<&'static str>>,
    shutdowns: AtomicUsize,
    scopes_generated: AtomicUsize,
    applied_scope: Mutex<Option<String>>,
    started_with: Mutex<Option<(HostMetadata, ArgList)>>,
    crypto_loaded_at: Mutex<Option<Instant>>,
    crypto_options: Mutex<Option<CryptoOptions>>,
    log_tx: broadcast::Sender<EngineLogEntry>,
}

impl MockEngine {
    pub fn new(master: MasterSwitch) -> Self {
        let (log_tx, _) = broadcast::channel(16);
        Self {
            master,
            crypto_failure: None,
            accept_application_id: true,
            outcome: StartOutcome::Success,
            core_manifest: Vec::new(),
            crypto_delay: None,
            scope_delay: None,
            calls: Mutex::new(Vec::new()),
            shutdowns: AtomicUsize::new(0),
            scopes_generated: AtomicUsize::new(0),
            applied_scope: Mutex::new(None),
            started_with: Mutex::new(None),
            crypto_loaded_at: Mutex::new(None),
            crypto_options: Mutex::new(None),
            log_tx,
        }
    }

    pub fn with_outcome(mut self, outcome: StartOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_crypto_failure(mut self, message: &str) -> Self {
        self.crypto_failure = Some(message.to_string());
        self
    }

    pub fn rejecting_application_id(mut self) -> Self {
        self.accept_application_id = false;
        self
    }

    pub fn with_core_manifest(mut self, files: &[&str]) -> Self {
        self.core_manifest = files.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Block the calling thread inside `load_crypto`.
    pub fn with_crypto_delay(mut self, delay: Duration) -> Self {
        self.crypto_delay = Some(delay);
        self
    }

    /// Block the calling thread inside `generate_scope_id`.
    pub fn with_scope_delay(mut self, delay: Duration) -> Self {
        self.scope_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn scopes_generated(&self) -> usize {
        self.scopes_generated.load(Ordering::SeqCst)
    }

    pub fn applied_scope(&self) -> Option<String> {
        self.applied_scope.lock().unwrap().clone()
    }

    pub fn started_with(&self) -> Option<(HostMetadata, ArgList)> {
        self.started_with.lock().unwrap().clone()
    }

    pub fn crypto_loaded_at(&self) -> Option<Instant> {
        *self.crypto_loaded_at.lock().unwrap()
    }

    pub fn crypto_options(&self) -> Option<CryptoOptions> {
        self.crypto_options.lock().unwrap().clone()
    }

    /// Publish a system-log entry as the engine would.
    pub fn emit(&self, event_id: i64, serial: u64, message: &str) {
        let _ = self.log_tx.send(EngineLogEntry {
            event_id,
            serial,
            message: message.to_string(),
            level: MessageLevel::Message,
        });
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Engine for MockEngine {
    fn load_crypto(&self, options: &CryptoOptions, log: &StartupLog) -> Result<(), EngineError> {
        self.record("load_crypto");
        if let Some(delay) = self.crypto_delay {
            std::thread::sleep(delay);
        }
        *self.crypto_loaded_at.lock().unwrap() = Some(Instant::now());
        *self.crypto_options.lock().unwrap() = Some(options.clone());
        log.write_to_log(1, "Crypto", "mock provider", MessageLevel::Debug);
        match &self.crypto_failure {
            Some(message) => Err(EngineError::Crypto(message.clone())),
            None => Ok(()),
        }
    }

    fn set_application_id(&self, _application_id: &str) -> bool {
        self.record("set_application_id");
        self.accept_application_id
    }

    fn generate_scope_id(&self) -> String {
        self.record("generate_scope_id");
        if let Some(delay) = self.scope_delay {
            std::thread::sleep(delay);
        }
        let n = self.scopes_generated.fetch_add(1, Ordering::SeqCst) + 1;
        format!("SCOPE{n:03}")
    }

    fn apply_scope_id(&self, scope_id: &str) {
        self.record("apply_scope_id");
        *self.applied_scope.lock().unwrap() = Some(scope_id.to_string());
    }

    fn start(&self, metadata: &HostMetadata, settings: &ArgList) -> Result<bool, EngineError> {
        self.record("start");
        *self.started_with.lock().unwrap() = Some((metadata.clone(), settings.clone()));
        match &self.outcome {
            StartOutcome::Success => Ok(true),
            StartOutcome::Refuse => Ok(false),
            StartOutcome::Fault(message) => Err(EngineError::Start(message.clone())),
        }
    }

    fn shutdown(&self, _force_immediate: bool, _is_planned_stop: bool) {
        self.record("shutdown");
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.master.turn_off();
    }

    fn core_manifest(&self) -> Vec<String> {
        self.core_manifest.clone()
    }

    fn system_log(&self) -> Option<broadcast::Receiver<EngineLogEntry>> {
        Some(self.log_tx.subscribe())
    }
}

/// Hooks that inject a setting, brand the metadata and record `after_startup`.
#[derive(Default)]
pub struct RecordingHooks {
    after_startup: Mutex<Vec<bool>>,
    arg_updates: AtomicUsize,
    metadata_updates: AtomicUsize,
}

impl RecordingHooks {
    pub fn after_startup_calls(&self) -> Vec<bool> {
        self.after_startup.lock().unwrap().clone()
    }

    pub fn arg_updates(&self) -> usize {
        self.arg_updates.load(Ordering::SeqCst)
    }

    pub fn metadata_updates(&self) -> usize {
        self.metadata_updates.load(Ordering::SeqCst)
    }
}

impl ExtensionHooks for RecordingHooks {
    fn update_arg_list(&self, args: &mut ArgList, log: &StartupLog) {
        self.arg_updates.fetch_add(1, Ordering::SeqCst);
        args.set("Injected", "yes");
        log.log("Settings added by test hooks");
    }

    fn update_host_metadata(&self, metadata: &mut HostMetadata, _log: &StartupLog) {
        self.metadata_updates.fetch_add(1, Ordering::SeqCst);
        metadata.title = "Test-Service".to_string();
        metadata.main_executable = "test-service".to_string();
    }

    fn after_startup(&self, success: bool) {
        self.after_startup.lock().unwrap().push(success);
    }
}

/// Write a sentinel into `dir` pointing at `dir/logs/a.log`.
pub fn write_sentinel(dir: &Path, delay_ms: Option<u64>) -> (PathBuf, PathBuf) {
    let target = dir.join("logs").join("a.log");
    let sentinel = dir.join(SENTINEL_FILE);
    let mut content = format!("{}\n", target.display());
    if let Some(delay) = delay_ms {
        content.push_str(&format!("{delay}\n"));
    }
    fs::write(&sentinel, content).unwrap();
    (sentinel, target)
}

/// Startup-log lines with their timestamp prefix stripped.
pub fn read_log(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| {
            line.split_once(": ")
                .map(|(_, text)| text.to_string())
                .unwrap_or_else(|| line.to_string())
        })
        .collect()
}

/// Assert each expected fragment appears in a later line than the previous one.
pub fn assert_in_order(lines: &[String], expected: &[&str]) {
    let mut cursor = 0;
    for fragment in expected {
        match lines[cursor..].iter().position(|l| l.contains(fragment)) {
            Some(offset) => cursor += offset + 1,
            None => panic!(
                "checkpoint {fragment:?} missing or out of order\nlog:\n{}",
                lines.join("\n")
            ),
        }
    }
}

/// Poll until the host reaches `state`.
pub async fn wait_for_state(host: &ServiceHost, state: LifecycleState) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while host.state() != state {
        assert!(
            Instant::now() < deadline,
            "host stuck in {:?} waiting for {:?}",
            host.state(),
            state
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// A host over a mock engine, with handles the tests need.
pub struct Harness {
    pub host: Arc<ServiceHost>,
    pub engine: Arc<MockEngine>,
    pub hooks: Arc<RecordingHooks>,
    pub master: MasterSwitch,
    pub lifetime: Arc<worker_host::lifecycle::HostLifetime>,
}

/// Build a harness. `engine` scripts the mock, `customize` adjusts the builder.
pub fn harness(
    engine: impl FnOnce(MockEngine) -> MockEngine,
    config: &[(&str, &str)],
    log: StartupLog,
    customize: impl FnOnce(
        worker_host::lifecycle::ServiceHostBuilder,
    ) -> worker_host::lifecycle::ServiceHostBuilder,
) -> Harness {
    use worker_host::config::MemoryConfigSource;
    use worker_host::lifecycle::HostLifetime;
    use worker_host::service::ServiceDefinition;

    let master = MasterSwitch::new();
    let engine = Arc::new(engine(MockEngine::new(master.clone())));
    let hooks = Arc::new(RecordingHooks::default());
    let lifetime = Arc::new(HostLifetime::new());
    let source: MemoryConfigSource = config.iter().copied().collect();

    let builder = ServiceHost::builder(
        ServiceDefinition::new("test-service", hooks.clone()),
        engine.clone(),
    )
    .config(Arc::new(source))
    .lifetime(lifetime.clone())
    .master_switch(master.clone())
    .startup_log(log)
    .tick(Duration::from_millis(20));

    Harness {
        host: Arc::new(customize(builder).build()),
        engine,
        hooks,
        master,
        lifetime,
    }
}

impl Harness {
    /// Run `execute` on a background task.
    pub fn spawn(&self) -> tokio::task::JoinHandle<LifecycleState> {
        let host = self.host.clone();
        let stopping = self.lifetime.stopping_token();
        tokio::spawn(async move { host.execute(stopping).await })
    }
}
