//! tunnel-console: interactive front-end for a TUN tunnel
//!
//! One long-lived terminal session moves between a setup wizard (pick client
//! or server mode and a configuration) and a live dashboard (connection
//! state, traffic, log tail), while the application drives it through a
//! blocking request/response handle.
//!
//! # Architecture
//!
//! - **Session**: phase coordinator, event loop thread and blocking handle
//! - **Configurator**: wizard sub-model and configuration stores
//! - **Dashboard**: runtime sub-model, log feed and traffic counters
//! - **TUI**: message/command plumbing, terminal handling, shared widgets
//! - **Prefs**: persisted user preferences with whole-value replacement
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tunnel_console::configurator::{ConfiguratorOptions, FsClientConfigStore};
//! use tunnel_console::dashboard::{LogFeed, RuntimeOptions};
//! use tunnel_console::prefs::{Preferences, PreferencesStore};
//! use tunnel_console::session::{with_cancel, Session};
//!
//! # fn main() -> Result<(), tunnel_console::SessionError> {
//! let prefs = Arc::new(PreferencesStore::in_memory(Preferences::default()));
//! let clients = Arc::new(FsClientConfigStore::new("/etc/tunnel/clients".into()));
//! let session = Session::builder(ConfiguratorOptions::new(prefs).with_client_configs(clients))
//!     .start()?;
//!
//! let mode = session.wait_for_mode()?;
//! let (_link, context) = with_cancel();
//! session.activate_runtime(RuntimeOptions::new(mode.operating_mode(), LogFeed::new(), context));
//! let _ = session.wait_for_runtime_exit();
//! session.close();
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod cli;
pub mod configurator;
pub mod dashboard;
pub mod error;
pub mod prefs;
pub mod sequence;
pub mod session;
pub mod tui;

pub use error::SessionError;
