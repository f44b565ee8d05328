//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! execute(stopping):
//!     startup delay → initialize (startup.rs) → start engine
//!     → run loop (tick / master switch / console probe) → stop
//!
//! stop() (shutdown.rs latch):
//!     request application stop → engine shutdown → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → ApplicationLifetime::stop_application
//! ```
//!
//! # Design Decisions
//! - One task drives the state machine; `stop` may race it and is one-shot
//! - Failures never escape `execute`; they become `Failed` and then `Stopped`
//! - Redirected input is a distinct wait mode, not an error

pub mod console;
pub mod error;
pub mod host;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use console::{ConsoleProbe, DetachedConsole, ProbeError, StdinConsole};
pub use error::{LifecycleError, LifecycleResult};
pub use host::{HostOptions, LoopExit, ServiceHost, ServiceHostBuilder, DEFAULT_TICK};
pub use shutdown::{ApplicationLifetime, HostLifetime, ShutdownLatch};
pub use startup::BootSession;
pub use state::{LifecycleState, StateCell};
