//! Extension hooks a concrete service supplies.

use std::sync::Arc;

use crate::config::ArgList;
use crate::observability::StartupLog;
use crate::service::metadata::{HostMetadata, HostType};

/// Customization points invoked by the host at fixed boot steps.
///
/// Every method defaults to a no-op.
pub trait ExtensionHooks: Send + Sync {
    /// Edit the effective settings once, before the engine sees them.
    fn update_arg_list(&self, _args: &mut ArgList, _log: &StartupLog) {}

    /// Overwrite identity and branding once, after defaults are populated.
    fn update_host_metadata(&self, _metadata: &mut HostMetadata, _log: &StartupLog) {}

    /// Called exactly once after the engine-start attempt resolves.
    fn after_startup(&self, _success: bool) {}
}

/// Hook set that changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ExtensionHooks for NoopHooks {}

/// A concrete service: its identity plus its hooks.
#[derive(Clone)]
pub struct ServiceDefinition {
    /// Identity string registered with the engine.
    pub application_id: String,
    pub host_type: HostType,
    pub hooks: Arc<dyn ExtensionHooks>,
}

impl ServiceDefinition {
    pub fn new(application_id: impl Into<String>, hooks: Arc<dyn ExtensionHooks>) -> Self {
        Self {
            application_id: application_id.into(),
            host_type: HostType::default(),
            hooks,
        }
    }

    pub fn with_host_type(mut self, host_type: HostType) -> Self {
        self.host_type = host_type;
        self
    }
}

impl std::fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("application_id", &self.application_id)
            .field("host_type", &self.host_type)
            .finish_non_exhaustive()
    }
}
