//! Command-line interface definitions for tunnel-console.
//!
//! Uses clap's derive API for type-safe argument parsing.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::prefs::PREFERENCES_FILE;

/// Application directory name under the platform config directory.
pub const APP_DIR: &str = "tunnel-console";

/// Interactive front-end for the TUN tunnel.
///
/// Pick a stored client configuration or run as a server, then watch the
/// live connection. Press `r` on the dashboard to pick again.
#[derive(Parser, Debug)]
#[command(name = "tunnel-console")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding client configurations and the server config.
    ///
    /// Defaults to the platform config directory
    /// (e.g. `~/.config/tunnel-console`).
    #[arg(long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Preferences file.
    ///
    /// Defaults to `preferences.toml` inside the config directory.
    #[arg(long = "preferences", value_name = "PATH")]
    pub preferences: Option<PathBuf>,

    /// Write logs to this file.
    ///
    /// The terminal belongs to the interface, so nothing is logged to
    /// stderr while it runs.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Hide server mode from the wizard.
    #[arg(long = "no-server")]
    pub no_server: bool,

    /// Increase log verbosity.
    ///
    /// Can be specified multiple times:
    /// -v    = info level
    /// -vv   = debug level
    /// -vvv  = trace level
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Filesystem locations used by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Root configuration directory.
    pub config_dir: PathBuf,
    /// Preferences file.
    pub preferences: PathBuf,
    /// One TOML file per client configuration.
    pub clients_dir: PathBuf,
    /// Server configuration file.
    pub server_config: PathBuf,
}

impl Paths {
    /// Standard layout under `config_dir`.
    #[must_use]
    pub fn under(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            preferences: config_dir.join(PREFERENCES_FILE),
            clients_dir: config_dir.join("clients"),
            server_config: config_dir.join("server.toml"),
        }
    }
}

impl Cli {
    /// Resolve paths from flags and platform defaults.
    ///
    /// Returns `None` when no config directory was given and the platform
    /// has none.
    #[must_use]
    pub fn paths(&self) -> Option<Paths> {
        let config_dir = match &self.config_dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()?.join(APP_DIR),
        };

        let mut paths = Paths::under(&config_dir);
        if let Some(prefs) = &self.preferences {
            paths.preferences = prefs.clone();
        }
        Some(paths)
    }
}
