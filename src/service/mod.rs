//! Concrete-service surface.
//!
//! # Responsibilities
//! - Describe the service to the engine (metadata.rs)
//! - Define the customization hooks a service overrides (hooks.rs)
//! - Ship a sample relay service for the binary (relay.rs)

pub mod hooks;
pub mod metadata;
pub mod relay;

pub use hooks::{ExtensionHooks, NoopHooks, ServiceDefinition};
pub use metadata::{DebugLevel, HostMetadata, HostType};
pub use relay::SampleRelay;
