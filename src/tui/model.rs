//! The capability every embeddable phase screen provides.

use ratatui::{layout::Rect, Frame};

use super::cmd::Cmd;
use super::msg::Msg;

/// A screen that can be hosted by the session coordinator.
///
/// Updates consume the old value and return the next one, so every message
/// yields a fresh snapshot instead of mutating shared state.
pub trait SubModel: Sized {
    /// Work to start when the model becomes active.
    fn init(&self) -> Cmd {
        Cmd::none()
    }

    /// Consume one message.
    fn update(self, msg: Msg) -> (Self, Cmd);

    /// Draw the current state into `area`.
    fn view(&self, frame: &mut Frame, area: Rect);
}
