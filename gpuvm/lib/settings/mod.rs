//! Per-VM remote connection settings.
//!
//! Settings are advisory: a load that finds nothing (or fails) yields the defaults, and a save
//! that fails is logged and swallowed. The console never blocks a connection on this data. The
//! backend store keeps one blob per VM name and a save overwrites the previous blob whole, so
//! the last writer wins.

use std::sync::Arc;

use getset::{Getters, Setters};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    backend::VmBackend,
    log::{AuditLog, LogLevel},
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The remote connection preferences for one VM.
///
/// Unknown fields in a stored blob are ignored and missing fields fall back to their defaults,
/// so blobs written by older console versions stay loadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Setters)]
#[getset(get = "pub with_prefix", set = "pub with_prefix")]
#[serde(default)]
pub struct ConnectionSettings {
    /// Desktop width in pixels.
    width: u32,

    /// Desktop height in pixels.
    height: u32,

    /// Display scaling in percent.
    scale_percent: u32,

    /// Whether the session opens full screen.
    fullscreen: bool,

    /// The account to connect as.
    username: Option<String>,

    /// The stored password, if the user chose to keep one.
    password: Option<String>,

    /// Host drives shared into the session.
    shared_drives: Vec<String>,

    /// Whether guest audio plays on the host.
    redirect_audio: bool,

    /// Whether the clipboard is shared with the guest.
    redirect_clipboard: bool,
}

/// Loads and saves [`ConnectionSettings`] through the backend store.
#[derive(Debug, Clone)]
pub struct SettingsClient<B: VmBackend> {
    backend: Arc<B>,
    audit: AuditLog,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<B: VmBackend> SettingsClient<B> {
    /// Creates a client over the given backend.
    pub fn new(backend: Arc<B>, audit: AuditLog) -> Self {
        Self { backend, audit }
    }

    /// Loads the settings for a VM, falling back to the defaults when nothing was saved or the
    /// store is unreachable. A failed load is recorded in the audit log.
    pub async fn load(&self, name: &str) -> ConnectionSettings {
        match self.backend.load_settings(name).await {
            Ok(Some(settings)) => settings,
            Ok(None) => ConnectionSettings::default(),
            Err(error) => {
                warn!(vm = name, %error, "failed to load connection settings");
                self.audit.append(
                    LogLevel::Warn,
                    "settings",
                    format!("Could not load settings for '{}': {}", name, error),
                );
                ConnectionSettings::default()
            }
        }
    }

    /// Saves the settings for a VM, overwriting any previous blob. A failed save is recorded in
    /// the audit log and otherwise swallowed.
    pub async fn save(&self, name: &str, settings: &ConnectionSettings) {
        if let Err(error) = self.backend.save_settings(name, settings).await {
            warn!(vm = name, %error, "failed to save connection settings");
            self.audit.append(
                LogLevel::Warn,
                "settings",
                format!("Could not save settings for '{}': {}", name, error),
            );
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            scale_percent: 100,
            fullscreen: false,
            username: Some("Administrator".to_string()),
            password: None,
            shared_drives: Vec::new(),
            redirect_audio: true,
            redirect_clipboard: true,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
