//! Boot sequence.
//!
//! # Steps
//! ```text
//! initialize:   snapshot settings → update_arg_list → load crypto
//!               → set application id → default metadata → update_host_metadata
//!               → application manifest
//! start_engine: [random scope] → engine.start(metadata, settings)
//! ```
//!
//! Both steps return errors instead of logging them; the host decides how a
//! failure maps onto the state machine.

use std::sync::Arc;

use crate::config::{keys, ArgList, ConfigSource, LayeredSettings, SettingsStore};
use crate::engine::{CryptoOptions, Engine};
use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::observability::{MessageLevel, StartupLog};
use crate::service::{HostMetadata, HostType, ServiceDefinition};

/// Everything assembled during a boot.
#[derive(Debug, Clone)]
pub struct BootSession {
    /// Effective settings; frozen once handed to the engine.
    pub args: ArgList,
    pub settings: LayeredSettings,
    pub metadata: HostMetadata,
}

/// Borrowed view of the collaborators one boot needs.
pub(crate) struct Boot<'a> {
    pub service: &'a ServiceDefinition,
    pub engine: &'a dyn Engine,
    pub config: &'a Arc<dyn ConfigSource>,
    pub base: &'a Arc<dyn SettingsStore>,
    pub log: &'a StartupLog,
}

impl Boot<'_> {
    /// Assemble settings, load security and build the host metadata.
    pub fn initialize(&self) -> LifecycleResult<BootSession> {
        let hooks = &self.service.hooks;

        let mut args = ArgList::from_source(self.config.as_ref());
        hooks.update_arg_list(&mut args, self.log);
        let settings = LayeredSettings::new(self.config.clone(), self.base.clone());
        tracing::debug!(settings = args.len(), "Effective settings assembled");

        self.log.log("Service: Loading security subsystem");
        self.engine
            .load_crypto(&CryptoOptions::from_args(&args), self.log)?;

        self.log.log("Service: Setting application id");
        if !self.engine.set_application_id(&self.service.application_id) {
            return Err(LifecycleError::IllegalApplicationId);
        }

        self.log.log("Service: Creating service host");
        let mut metadata = HostMetadata::new(self.service.host_type);
        hooks.update_host_metadata(&mut metadata, self.log);

        if metadata.host_type == HostType::Application {
            let mut files = vec![metadata.main_executable.clone()];
            files.extend(self.engine.core_manifest());
            metadata.add_manifest_files(files);
        }

        if let Ok(dump) = serde_json::to_string(&metadata) {
            self.log.log_at(format!("Service: Host metadata {dump}"), MessageLevel::Debug);
        }
        self.log.log("Service: Created service host");

        Ok(BootSession {
            args,
            settings,
            metadata,
        })
    }

    /// Apply a random scope if requested, then start the engine.
    pub fn start_engine(&self, session: &mut BootSession) -> LifecycleResult<()> {
        if session.settings.flag(keys::USE_RANDOM_SCOPE)
            && session.settings.flag(keys::USE_RANDOM_DEVICE_ID)
        {
            let scope_id = self.engine.generate_scope_id();
            self.engine.apply_scope_id(&scope_id);
            self.log.log("Service: Applied random scope");
            tracing::info!(scope_id = %scope_id, "Random scope applied");
            session.metadata.seal_id = Some(scope_id);
        }

        self.log.log("Service: Starting engine");
        match self.engine.start(&session.metadata, &session.args)? {
            true => Ok(()),
            false => Err(LifecycleError::EngineRefused),
        }
    }
}
