//! User preferences.
//!
//! Preferences are a small TOML document stored next to the client
//! configurations:
//!
//! ```toml
//! theme = "dark"
//! language = "en"
//! stats_units = "bits"
//! show_dataplane_stats = true
//! show_dataplane_logs = true
//! show_footer = true
//! auto_select_mode = "client"
//! auto_connect = true
//! auto_select_client_config = "/home/me/.config/tunnel-console/clients/office.toml"
//! ```
//!
//! Every field is optional on disk. Unknown or malformed values fall back
//! to their defaults instead of failing the load.
//!
//! The [`PreferencesStore`] holds the current snapshot. Readers get an
//! `Arc<Preferences>` that never changes underneath them; writers replace
//! the whole value at once.

mod error;
mod schema;
mod store;

pub use error::PreferencesError;
pub use schema::{AutoSelectMode, Preferences, StatsUnits, Theme, DEFAULT_LANGUAGE};
pub use store::{PreferencesStore, PREFERENCES_FILE};
