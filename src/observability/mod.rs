//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Before the logging pipeline exists:
//!     → startup_log.rs (sentinel-gated, best-effort, tracing + flat file)
//!
//! After init_logging():
//!     → logging.rs (tracing-subscriber, env filter)
//!     → metrics.rs (lifecycle gauges and counters)
//! ```
//!
//! # Design Decisions
//! - The startup log never returns errors to its caller
//! - Startup-log events carry the `startup` target so they can be filtered
//! - Metrics are recorded through the `metrics` facade; exporting is optional

pub mod logging;
pub mod metrics;
pub mod startup_log;

pub use startup_log::{MessageLevel, StartupLog, StartupLogConfig};
