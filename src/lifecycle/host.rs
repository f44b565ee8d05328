//! Service host: drives the engine through start, run and stop.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use crate::config::{keys, ArgList, BaseSettings, ConfigSource, MemoryConfigSource, SettingsStore};
use crate::engine::{Engine, EngineError, EngineLogEntry, MasterSwitch};
use crate::lifecycle::console::{ConsoleProbe, DetachedConsole};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::shutdown::{ApplicationLifetime, HostLifetime, ShutdownLatch};
use crate::lifecycle::startup::{Boot, BootSession};
use crate::lifecycle::state::{LifecycleState, StateCell};
use crate::observability::{metrics, MessageLevel, StartupLog};
use crate::service::{HostMetadata, ServiceDefinition};

/// Run-loop polling interval.
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

/// Tunables for the host.
#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Upper bound on how long the run loop sleeps between checks.
    pub tick: Duration,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self { tick: DEFAULT_TICK }
    }
}

/// Why the run loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The stopping token was cancelled.
    Cancelled,
    /// The engine turned the master switch off.
    MasterSwitchOff,
    /// Interactive polling was invalid; the host blocked on the master switch.
    InputRedirected,
}

impl fmt::Display for LoopExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopExit::Cancelled => write!(f, "stop requested"),
            LoopExit::MasterSwitchOff => write!(f, "master switch was off"),
            LoopExit::InputRedirected => write!(f, "master switch released after redirected input"),
        }
    }
}

/// Builder for [`ServiceHost`].
pub struct ServiceHostBuilder {
    service: ServiceDefinition,
    engine: Arc<dyn Engine>,
    config: Option<Arc<dyn ConfigSource>>,
    base_settings: Option<Arc<dyn SettingsStore>>,
    lifetime: Option<Arc<dyn ApplicationLifetime>>,
    master: Option<MasterSwitch>,
    console: Option<Arc<dyn ConsoleProbe>>,
    startup_log: Option<StartupLog>,
    options: HostOptions,
}

impl ServiceHostBuilder {
    pub fn config(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn base_settings(mut self, base: Arc<dyn SettingsStore>) -> Self {
        self.base_settings = Some(base);
        self
    }

    pub fn lifetime(mut self, lifetime: Arc<dyn ApplicationLifetime>) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Master switch shared with the engine.
    pub fn master_switch(mut self, master: MasterSwitch) -> Self {
        self.master = Some(master);
        self
    }

    pub fn console(mut self, console: Arc<dyn ConsoleProbe>) -> Self {
        self.console = Some(console);
        self
    }

    /// Use this startup log instead of detecting the sentinel in the working directory.
    pub fn startup_log(mut self, log: StartupLog) -> Self {
        self.startup_log = Some(log);
        self
    }

    pub fn tick(mut self, tick: Duration) -> Self {
        self.options.tick = tick;
        self
    }

    pub fn build(self) -> ServiceHost {
        let startup_log = self.startup_log.unwrap_or_else(StartupLog::detect);
        startup_log.log("Service: Constructing service host");

        let host = ServiceHost {
            service: self.service,
            engine: self.engine,
            config: self
                .config
                .unwrap_or_else(|| Arc::new(MemoryConfigSource::new())),
            base_settings: self
                .base_settings
                .unwrap_or_else(|| Arc::new(BaseSettings::new())),
            lifetime: self
                .lifetime
                .unwrap_or_else(|| Arc::new(HostLifetime::new())),
            master: self.master.unwrap_or_default(),
            console: self.console.unwrap_or_else(|| Arc::new(DetachedConsole)),
            startup_log,
            options: self.options,
            state: StateCell::new(),
            stop_latch: ShutdownLatch::new(),
            engine_attempted: Mutex::new(false),
            session: Mutex::new(None),
        };

        host.startup_log
            .log("Service: Exiting service instance constructor");
        host
    }
}

/// Hosts one service and its engine for the lifetime of the process.
///
/// `execute` drives the lifecycle; `stop` may be called concurrently from an
/// external stop path and runs its shutdown work once.
pub struct ServiceHost {
    service: ServiceDefinition,
    engine: Arc<dyn Engine>,
    config: Arc<dyn ConfigSource>,
    base_settings: Arc<dyn SettingsStore>,
    lifetime: Arc<dyn ApplicationLifetime>,
    master: MasterSwitch,
    console: Arc<dyn ConsoleProbe>,
    startup_log: StartupLog,
    options: HostOptions,
    state: StateCell,
    stop_latch: ShutdownLatch,
    /// Set once the engine may have been started. Held across the start call
    /// so that `stop` never shuts the engine down before it starts.
    engine_attempted: Mutex<bool>,
    session: Mutex<Option<BootSession>>,
}

impl ServiceHost {
    pub fn builder(service: ServiceDefinition, engine: Arc<dyn Engine>) -> ServiceHostBuilder {
        ServiceHostBuilder {
            service,
            engine,
            config: None,
            base_settings: None,
            lifetime: None,
            master: None,
            console: None,
            startup_log: None,
            options: HostOptions::default(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state.current()
    }

    /// Every state entered so far.
    pub fn state_history(&self) -> Vec<LifecycleState> {
        self.state.history()
    }

    pub fn startup_log(&self) -> &StartupLog {
        &self.startup_log
    }

    pub fn master_switch(&self) -> &MasterSwitch {
        &self.master
    }

    /// Metadata as handed to the engine, once initialization succeeded.
    pub fn host_metadata(&self) -> Option<HostMetadata> {
        self.session
            .lock()
            .expect("session mutex poisoned")
            .as_ref()
            .map(|s| s.metadata.clone())
    }

    /// Effective settings as handed to the engine, once initialization succeeded.
    pub fn effective_settings(&self) -> Option<ArgList> {
        self.session
            .lock()
            .expect("session mutex poisoned")
            .as_ref()
            .map(|s| s.args.clone())
    }

    /// Run the whole lifecycle until the host has stopped.
    ///
    /// Never fails: every error is logged and turned into a state transition.
    pub async fn execute(&self, stopping: CancellationToken) -> LifecycleState {
        let log = &self.startup_log;
        log.log("Service: Main function");
        log.log(format!(
            "Service: Running as {:?} host",
            self.service.host_type
        ));

        let delay = log.start_delay();
        if !delay.is_zero() {
            log.log(format!(
                "Waiting {} ms before starting host",
                delay.as_millis()
            ));
            tokio::time::sleep(delay).await;
        }

        if self.start_internal() {
            self.run_loop(&stopping).await;
        }

        self.stop();
        log.log("Service: Leaving main function");
        self.state()
    }

    /// Initialize and start the engine. Returns true when the host is running.
    fn start_internal(&self) -> bool {
        let log = &self.startup_log;

        if let Err(e) = self.state.transition(LifecycleState::Initializing) {
            log.log_at(format!("Service: Not starting: {e}"), MessageLevel::Warning);
            return false;
        }
        log.log("Service: Initializing");

        let boot = Boot {
            service: &self.service,
            engine: self.engine.as_ref(),
            config: &self.config,
            base: &self.base_settings,
            log,
        };

        let mut session = match boot.initialize() {
            Ok(session) => session,
            Err(e) => {
                log.log_at(format!("Service: Initializing FAILED: {e}"), MessageLevel::Error);
                tracing::error!(error = %e, "Host initialization failed");
                self.fail();
                self.service.hooks.after_startup(false);
                return false;
            }
        };
        log.log("Service: Initialized");

        let outcome = {
            let mut attempted = self
                .engine_attempted
                .lock()
                .expect("engine gate mutex poisoned");
            if let Err(e) = self.state.transition(LifecycleState::EngineStarting) {
                log.log_at(format!("Service: Not starting engine: {e}"), MessageLevel::Warning);
                self.service.hooks.after_startup(false);
                return false;
            }
            *attempted = true;
            boot.start_engine(&mut session)
        };
        let forward_log = self.startup_log.is_enabled() && session.args.flag(keys::DISABLE_CONSOLE);
        let engine_log = if forward_log && outcome.is_ok() {
            self.engine.system_log()
        } else {
            None
        };
        *self.session.lock().expect("session mutex poisoned") = Some(session);

        match outcome {
            Ok(()) => {
                log.log("Service: Engine start success");
                metrics::record_engine_start("success");

                if let Err(e) = self.state.transition(LifecycleState::Running) {
                    // Only stop() moves the host off EngineStarting; it owns the engine shutdown
                    log.log_at(
                        format!("Service: Stop requested during engine start: {e}"),
                        MessageLevel::Warning,
                    );
                    self.service.hooks.after_startup(false);
                    return false;
                }
                if let Some(rx) = engine_log {
                    self.forward_engine_log(rx);
                }
                self.service.hooks.after_startup(true);
                true
            }
            Err(e) => {
                let outcome = match &e {
                    LifecycleError::Engine(EngineError::Start(_)) => "fault",
                    _ => "refused",
                };
                log.log_at(format!("Service: Engine start failed: {e}"), MessageLevel::Error);
                tracing::error!(error = %e, error_debug = ?e, outcome, "Engine start failed");
                metrics::record_engine_start(outcome);

                self.fail();
                self.service.hooks.after_startup(false);
                false
            }
        }
    }

    fn fail(&self) {
        if let Err(e) = self.state.transition(LifecycleState::Failed) {
            tracing::debug!(error = %e, "Failure recorded after stop began");
        }
    }

    /// Poll the run condition until it clears.
    async fn run_loop(&self, stopping: &CancellationToken) -> LoopExit {
        let log = &self.startup_log;
        log.log("Service: Entering service loop");

        let exit = loop {
            if let Err(e) = self.console.check() {
                log.log(format!(
                    "Service: {e}. Waiting until application shuts down."
                ));
                self.master.wait_off().await;
                break LoopExit::InputRedirected;
            }

            if stopping.is_cancelled() {
                break LoopExit::Cancelled;
            }

            tokio::select! {
                _ = stopping.cancelled() => {}
                _ = self.master.wait_off() => {}
                _ = tokio::time::sleep(self.options.tick) => {}
            }

            if stopping.is_cancelled() {
                break LoopExit::Cancelled;
            }
            if !self.master.is_on() {
                break LoopExit::MasterSwitchOff;
            }
        };

        log.log(format!("Service: Leaving service loop because {exit}"));
        tracing::info!(reason = %exit, "Service loop exited");

        if exit != LoopExit::InputRedirected {
            log.log("Service: Initiating shutdown after exiting service loop");
            self.lifetime.stop_application();
        }
        exit
    }

    /// Stop the host. Only the first call does any work.
    ///
    /// An engine start already in progress finishes before the engine is shut down.
    pub fn stop(&self) {
        if !self.stop_latch.trip() {
            metrics::record_stop_request(false);
            tracing::debug!("Stop already handled");
            return;
        }
        metrics::record_stop_request(true);

        let log = &self.startup_log;
        log.log("Service: Stopping");
        if let Err(e) = self.state.transition(LifecycleState::Stopping) {
            tracing::warn!(error = %e, "Unexpected state at stop");
        }

        self.lifetime.stop_application();
        // Blocks until an in-flight engine start returns
        let attempted = *self
            .engine_attempted
            .lock()
            .expect("engine gate mutex poisoned");
        if attempted {
            self.engine.shutdown(false, true);
        }

        if let Err(e) = self.state.transition(LifecycleState::Stopped) {
            tracing::warn!(error = %e, "Unexpected state after stop");
        }
        log.log("Service: Stopped");
    }

    /// Copy engine system-log entries into the startup log.
    fn forward_engine_log(&self, mut rx: broadcast::Receiver<EngineLogEntry>) {
        let log = self.startup_log.clone();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(entry) => log.log_at(
                        format!("ID:{} SN:{} {}", entry.event_id, entry.serial, entry.message),
                        entry.level,
                    ),
                    Err(RecvError::Lagged(skipped)) => log.log_at(
                        format!("Service: {skipped} engine log entries dropped"),
                        MessageLevel::Warning,
                    ),
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

impl fmt::Debug for ServiceHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHost")
            .field("service", &self.service)
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
