//! Session error taxonomy.

use thiserror::Error;

/// Errors surfaced by the session handle and its sub-models.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The event loop terminated before the wait could be satisfied.
    #[error("session is closed")]
    SessionClosed,

    /// The user explicitly asked to leave the application.
    #[error("user quit")]
    UserQuit,

    /// The live connection ended while the dashboard was showing.
    ///
    /// The session stays alive and waits for the next activation.
    #[error("runtime disconnected")]
    RuntimeDisconnected,

    /// A collaborator required to build a sub-model was not supplied.
    #[error("missing required dependency: {0}")]
    MissingDependency(&'static str),

    /// Another caller is already blocked on a session wait.
    #[error("another wait on this session is already in progress")]
    WaitInProgress,

    /// Any other failure, passed through unmodified.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SessionError {
    /// Whether the session survives this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::RuntimeDisconnected)
    }
}

/// Result alias for session operations.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_disconnect_is_recoverable() {
        assert!(SessionError::RuntimeDisconnected.is_recoverable());
        assert!(!SessionError::UserQuit.is_recoverable());
        assert!(!SessionError::SessionClosed.is_recoverable());
        assert!(!SessionError::Other(anyhow::anyhow!("boom")).is_recoverable());
    }

    #[test]
    fn test_wrapped_error_is_transparent() {
        let err = SessionError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
    }
}
