//! Host metadata handed to the engine at start.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the process is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HostType {
    /// Interactive process attached to a console.
    Application,
    /// Detached background service.
    #[default]
    Service,
}

/// Engine diagnostic verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebugLevel {
    #[default]
    Off,
    Essentials,
    Verbose,
    Full,
}

/// Identity and branding of the hosted service.
///
/// Built with defaults during initialization, edited once by the
/// `update_host_metadata` hook, then frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMetadata {
    pub host_type: HostType,
    pub title: String,
    pub application_title: String,
    pub application_name: String,
    pub site_name: String,
    pub vendor_name: String,
    pub vendor_url: String,
    pub description: String,
    /// Executable listed first in application manifests.
    pub main_executable: String,
    pub device_id: Uuid,
    pub vendor_id: Uuid,
    pub icon: String,
    /// `;`-separated status colors.
    pub status_colors: String,
    /// Heartbeat interval in seconds.
    pub heartbeat_rate: u32,
    pub current_version: String,
    pub debug_level: DebugLevel,
    pub local_service_route: String,
    /// Scope applied before start when random scopes are requested.
    pub seal_id: Option<String>,
    manifest_files: Vec<String>,
}

impl HostMetadata {
    /// Default metadata for the given host type.
    pub fn new(host_type: HostType) -> Self {
        Self {
            host_type,
            title: String::new(),
            application_title: String::new(),
            application_name: "Factory-Relay".to_string(),
            site_name: String::new(),
            vendor_name: String::new(),
            vendor_url: String::new(),
            description: String::new(),
            main_executable: env!("CARGO_PKG_NAME").to_string(),
            device_id: Uuid::nil(),
            vendor_id: Uuid::nil(),
            icon: "iconTopLogo.png".to_string(),
            status_colors: ";#65bb00;orange".to_string(),
            heartbeat_rate: 3,
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            debug_level: DebugLevel::Off,
            local_service_route: "LOCALHOST".to_string(),
            seal_id: None,
            manifest_files: Vec::new(),
        }
    }

    /// Append manifest files, skipping blanks and duplicates.
    pub fn add_manifest_files<I, S>(&mut self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for file in files {
            let file = file.into();
            if file.trim().is_empty() || self.manifest_files.contains(&file) {
                continue;
            }
            self.manifest_files.push(file);
        }
    }

    pub fn manifest_files(&self) -> &[String] {
        &self.manifest_files
    }
}

impl Default for HostMetadata {
    fn default() -> Self {
        Self::new(HostType::default())
    }
}
