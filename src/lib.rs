//! Worker-process host library.
//!
//! Resolves layered settings, keeps a best-effort startup log before the main
//! logging pipeline exists, and drives an external engine through a
//! start/run/stop lifecycle customised by a service's extension hooks.

pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod observability;
pub mod service;

pub use config::{ArgList, LayeredSettings};
pub use engine::{Engine, MasterSwitch};
pub use lifecycle::{HostLifetime, LifecycleState, ServiceHost};
pub use observability::StartupLog;
pub use service::{ExtensionHooks, HostMetadata, ServiceDefinition};
