//! Setup wizard shown while the session is configuring.
//!
//! The wizard walks the user from a mode picker to either a stored client
//! configuration or the server configuration:
//!
//! ```text
//! ┌ Mode ─────────┐   Enter   ┌ Client configs ─┐  n  ┌ New config ─────┐
//! │ > Client      │ ────────► │ > Office VPN    │ ──► │ name = "..."    │
//! │   Server      │           │   Home lab      │ ◄── │ server = "..."  │
//! └───────────────┘           └─────────────────┘ Esc └─────────────────┘
//! ```
//!
//! When the wizard is finished it records an outcome and returns
//! [`Cmd::quit`](crate::tui::Cmd::quit); the coordinator reads the outcome.

mod error;
mod store;
mod view;
mod wizard;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use error::StoreError;
pub use store::{
    validate_client_config, ClientConfigEntry, ClientConfigStore, FsClientConfigStore,
    FsServerConfigManager, MemoryClientConfigStore, ServerConfigManager, DEFAULT_SERVER_CONFIG,
};
pub use wizard::{Configurator, PASTE_SETTLE};

use crate::prefs::PreferencesStore;

/// Which side of the tunnel this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    /// Connect to a remote server.
    Client,
    /// Accept clients.
    Server,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Client => write!(f, "client"),
            OperatingMode::Server => write!(f, "server"),
        }
    }
}

/// What the wizard settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedMode {
    /// Run as a client with the given configuration.
    Client {
        /// Chosen client configuration.
        config: PathBuf,
    },
    /// Run as a server with the given configuration.
    Server {
        /// Server configuration.
        config: PathBuf,
    },
}

impl SelectedMode {
    /// The mode without its configuration.
    #[must_use]
    pub fn operating_mode(&self) -> OperatingMode {
        match self {
            SelectedMode::Client { .. } => OperatingMode::Client,
            SelectedMode::Server { .. } => OperatingMode::Server,
        }
    }

    /// Configuration file backing the mode.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        match self {
            SelectedMode::Client { config } | SelectedMode::Server { config } => config,
        }
    }
}

impl fmt::Display for SelectedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.operating_mode(), self.config_path().display())
    }
}

/// Configurator-internal messages.
#[derive(Debug)]
pub enum ConfiguratorMsg {
    /// Apply the auto-select preference.
    AutoSelect,
    /// No input arrived for [`PASTE_SETTLE`] since round `seq` started.
    PasteSettled {
        /// Wizard instance that started the timer.
        generation: u64,
        /// Paste round the timer belongs to.
        seq: u64,
    },
}

impl ConfiguratorMsg {
    /// Wizard instance a timer message belongs to; `None` for messages
    /// that are not tied to one.
    #[must_use]
    pub fn generation(&self) -> Option<u64> {
        match self {
            ConfiguratorMsg::AutoSelect => None,
            ConfiguratorMsg::PasteSettled { generation, .. } => Some(*generation),
        }
    }
}

/// Collaborators and switches used to build a [`Configurator`].
#[derive(Clone)]
pub struct ConfiguratorOptions {
    /// Stored client configurations. Required.
    pub client_configs: Option<Arc<dyn ClientConfigStore>>,
    /// Server configuration. Required when `server_supported`.
    pub server_config: Option<Arc<dyn ServerConfigManager>>,
    /// Whether this build can run as a server.
    pub server_supported: bool,
    /// Shared preferences.
    pub preferences: Arc<PreferencesStore>,
    /// Honor the auto-select preferences on start.
    pub auto_select: bool,
}

impl ConfiguratorOptions {
    /// Options with no collaborators and auto-select enabled.
    #[must_use]
    pub fn new(preferences: Arc<PreferencesStore>) -> Self {
        Self {
            client_configs: None,
            server_config: None,
            server_supported: false,
            preferences,
            auto_select: true,
        }
    }

    /// Set the client configuration store.
    #[must_use]
    pub fn with_client_configs(mut self, store: Arc<dyn ClientConfigStore>) -> Self {
        self.client_configs = Some(store);
        self
    }

    /// Set the server configuration manager and enable server mode.
    #[must_use]
    pub fn with_server_config(mut self, manager: Arc<dyn ServerConfigManager>) -> Self {
        self.server_config = Some(manager);
        self.server_supported = true;
        self
    }

    /// Enable or disable server mode.
    #[must_use]
    pub fn server_supported(mut self, supported: bool) -> Self {
        self.server_supported = supported;
        self
    }

    /// Options for a wizard rebuilt after the user asked to reconfigure.
    ///
    /// Auto-select is off so the user actually gets to choose again.
    #[must_use]
    pub fn for_reconfigure(&self) -> Self {
        Self {
            auto_select: false,
            ..self.clone()
        }
    }
}

impl fmt::Debug for ConfiguratorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguratorOptions")
            .field("client_configs", &self.client_configs.is_some())
            .field("server_config", &self.server_config.is_some())
            .field("server_supported", &self.server_supported)
            .field("auto_select", &self.auto_select)
            .finish()
    }
}
