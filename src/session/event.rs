//! Values exchanged between the session loop and its handle.

use std::fmt;

use crate::configurator::SelectedMode;
use crate::error::SessionError;

/// Operating phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// The setup wizard is showing.
    #[default]
    Configuring,
    /// A mode was chosen; waiting for the application to activate the runtime.
    WaitingForRuntime,
    /// The live connection dashboard is showing.
    Runtime,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Configuring => write!(f, "configuring"),
            Phase::WaitingForRuntime => write!(f, "waiting-for-runtime"),
            Phase::Runtime => write!(f, "runtime"),
        }
    }
}

/// Outcome notification sent from the loop to a waiting caller.
#[derive(Debug)]
pub enum SessionEvent {
    /// The wizard finished with a mode.
    ModeSelected(SelectedMode),
    /// The user left the dashboard to pick a configuration again.
    Reconfigure,
    /// The live connection ended. The session keeps running.
    RuntimeDisconnected,
    /// The user, or the process context, ended the session.
    Exit,
    /// The session failed and stopped.
    Error(SessionError),
}

impl SessionEvent {
    /// Whether the loop stops after emitting this event.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Exit | SessionEvent::Error(_))
    }

    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::ModeSelected(_) => "mode-selected",
            SessionEvent::Reconfigure => "reconfigure",
            SessionEvent::RuntimeDisconnected => "runtime-disconnected",
            SessionEvent::Exit => "exit",
            SessionEvent::Error(_) => "error",
        }
    }
}

/// Non-error result of waiting for the runtime phase to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeExit {
    /// The user asked to choose a configuration again.
    Reconfigure,
}
