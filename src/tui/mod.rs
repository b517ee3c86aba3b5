//! Terminal user interface plumbing.
//!
//! This module provides the pieces the session loop is built from:
//! - `Msg` / `Cmd` - messages and follow-up work
//! - `SubModel` - the capability every phase screen implements
//! - `filter_quit` - keeps a sub-model's quit from ending the session
//! - `Surface` - real terminal or headless buffer
//! - Input reader, layouts, theme palette and shared widgets
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  Msg   ┌─────────────────────────────┐
//! │ input thread │ ─────► │          mailbox            │
//! └──────────────┘        └──────────────┬──────────────┘
//!        ▲                               ▼
//!        │                ┌─────────────────────────────┐
//!   Cmd::Task results ◄── │ update(msg) -> (model, Cmd) │
//!                         └──────────────┬──────────────┘
//!                                        ▼
//!                                  view(frame)
//! ```

pub mod cmd;
pub mod filter;
pub mod input;
pub mod layout;
pub mod model;
pub mod msg;
pub mod terminal;
pub mod theme;
pub mod widgets;

pub use cmd::{Cmd, Task};
pub use filter::filter_quit;
pub use input::spawn_input_reader;
pub use layout::{DashboardLayout, WizardLayout};
pub use model::SubModel;
pub use msg::Msg;
pub use terminal::{restore_terminal, Surface, TerminalGuard};
pub use theme::Palette;
pub use widgets::{FooterWidget, LogTailWidget};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Whether `key` is Ctrl+C, which always means "leave the application".
#[must_use]
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}
