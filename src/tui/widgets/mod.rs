//! Widgets shared by the wizard and the dashboard.
//!
//! - `LogTailWidget` - Scrollable tail of captured log lines
//! - `FooterWidget` - Keybinding bar with an optional status message

pub mod footer;
pub mod logs;

pub use footer::FooterWidget;
pub use logs::LogTailWidget;
