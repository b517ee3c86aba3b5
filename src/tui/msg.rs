//! Messages processed by the session loop.

use crossterm::event::{Event, KeyEvent, KeyEventKind};

use super::cmd::Cmd;
use crate::configurator::ConfiguratorMsg;
use crate::dashboard::{DashboardMsg, RuntimeOptions};

/// Everything that can arrive at the session loop.
///
/// Terminal input, timer and task completions, and control signals from
/// the session handle all share this one type so that they are processed
/// strictly in arrival order.
#[derive(Debug)]
pub enum Msg {
    /// A key press.
    Key(KeyEvent),
    /// Text delivered in one piece by bracketed paste.
    Paste(String),
    /// The terminal was resized to `(columns, rows)`.
    Resize(u16, u16),
    /// Terminate the program.
    Quit,
    /// Nothing happened. Produced by input we ignore and by filtered quits.
    Noop,
    /// Further commands to run.
    Batch(Vec<Cmd>),
    /// The process-level context was cancelled or the session was closed.
    Cancelled,
    /// Switch into the runtime dashboard.
    ActivateRuntime(RuntimeOptions),
    /// The live connection of the activation numbered `epoch` ended.
    RuntimeDone {
        /// Activation the notification belongs to.
        epoch: u64,
    },
    /// Configurator-internal completion.
    Configurator(ConfiguratorMsg),
    /// Dashboard-internal completion.
    Dashboard(DashboardMsg),
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            // Release and repeat events would double every keystroke on
            // terminals that report them.
            Event::Key(key) if key.kind == KeyEventKind::Press => Msg::Key(key),
            Event::Paste(text) => Msg::Paste(text),
            Event::Resize(cols, rows) => Msg::Resize(cols, rows),
            _ => Msg::Noop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::empty(),
            kind,
            state: KeyEventState::empty(),
        })
    }

    #[test]
    fn test_only_presses_become_keys() {
        assert!(matches!(Msg::from(key(KeyEventKind::Press)), Msg::Key(_)));
        assert!(matches!(Msg::from(key(KeyEventKind::Release)), Msg::Noop));
    }

    #[test]
    fn test_resize_and_paste() {
        assert!(matches!(Msg::from(Event::Resize(100, 40)), Msg::Resize(100, 40)));
        assert!(matches!(
            Msg::from(Event::Paste("hello".to_string())),
            Msg::Paste(ref s) if s == "hello"
        ));
        assert!(matches!(Msg::from(Event::FocusGained), Msg::Noop));
    }
}
