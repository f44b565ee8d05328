//! Sample relay service shipped with the `worker-host` binary.

use uuid::Uuid;

use crate::config::{keys, ArgList};
use crate::observability::StartupLog;
use crate::service::hooks::ExtensionHooks;
use crate::service::metadata::HostMetadata;

/// Stable device id so TLS identities survive restarts.
pub const RELAY_DEVICE_ID: Uuid = Uuid::from_u128(0x5f0c_2a41_93d7_4e2b_8c61_0b7d_e4a9_3c15);
pub const RELAY_VENDOR_ID: Uuid = Uuid::from_u128(0x1d8e_7b30_c2f4_4a96_b5e1_6f03_92ad_c874);

/// Relay hooks: loopback access and user mapping on, integrity checks off.
#[derive(Debug, Clone, Default)]
pub struct SampleRelay {
    /// Extra manifest entries shipped next to the executable.
    pub manifest_files: Vec<String>,
}

impl ExtensionHooks for SampleRelay {
    fn update_arg_list(&self, args: &mut ArgList, log: &StartupLog) {
        args.set(keys::ALLOW_LOCAL_HOST, "true");
        args.set(keys::USE_USER_MAPPER, "true");
        args.set(keys::DONT_VERIFY_INTEGRITY, "true");
        log.log("Settings added by host");
    }

    fn update_host_metadata(&self, metadata: &mut HostMetadata, log: &StartupLog) {
        metadata.title = "Sample-Relay".to_string();
        metadata.application_title = "Sample Relay Portal".to_string();
        metadata.application_name = "Sample-Relay".to_string();
        metadata.site_name = "https://relay.example.com".to_string();
        metadata.vendor_name = "Worker Host Contributors".to_string();
        metadata.vendor_url = "https://example.com".to_string();
        metadata.description = "The sample relay service".to_string();
        metadata.main_executable = env!("CARGO_PKG_NAME").to_string();
        metadata.device_id = RELAY_DEVICE_ID;
        metadata.vendor_id = RELAY_VENDOR_ID;
        metadata.add_manifest_files(self.manifest_files.iter().cloned());

        log.log("Host metadata updated by service");
    }

    fn after_startup(&self, success: bool) {
        if success {
            tracing::info!("Sample relay is up");
        } else {
            tracing::warn!("Sample relay failed to start");
        }
    }
}
