//! Follow-up work returned by sub-models.
//!
//! A [`Cmd`] never mutates state directly. Whatever it produces comes back
//! to the session loop as an ordinary [`Msg`] and goes through the same
//! update path as keyboard input.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::msg::Msg;

/// Asynchronous unit of work resolving to a message.
pub type Task = Pin<Box<dyn Future<Output = Msg> + Send + 'static>>;

/// Side effects requested by `init` or `update`.
#[derive(Default)]
pub enum Cmd {
    /// Nothing to do.
    #[default]
    None,
    /// Deliver a message on the next loop iteration.
    Msg(Msg),
    /// Run several commands; their results arrive in no particular order.
    Batch(Vec<Cmd>),
    /// Run a future on its own task and deliver its output.
    Task(Task),
}

impl fmt::Debug for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cmd::None => write!(f, "None"),
            Cmd::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Cmd::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Cmd::Task(_) => write!(f, "Task(..)"),
        }
    }
}

impl Cmd {
    /// No-op command.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Cmd::None
    }

    /// Ask the surrounding program to terminate.
    ///
    /// Sub-models use this to say "my phase is finished"; the session
    /// rewrites it before it can reach the loop.
    #[inline]
    #[must_use]
    pub fn quit() -> Self {
        Cmd::Msg(Msg::Quit)
    }

    /// Deliver `msg` back to the loop.
    #[inline]
    #[must_use]
    pub fn msg(msg: Msg) -> Self {
        Cmd::Msg(msg)
    }

    /// Combine commands, dropping no-ops.
    #[must_use]
    pub fn batch(cmds: impl IntoIterator<Item = Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Cmd::Batch(cmds),
        }
    }

    /// Run `future` and deliver its output.
    #[must_use]
    pub fn task<F>(future: F) -> Self
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        Cmd::Task(Box::pin(future))
    }

    /// Deliver `msg` after `delay`.
    #[must_use]
    pub fn after(delay: Duration, msg: Msg) -> Self {
        Cmd::task(async move {
            tokio::time::sleep(delay).await;
            msg
        })
    }

    /// Whether this command does nothing.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }

    /// Number of leaf commands, counting batches recursively.
    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        match self {
            Cmd::None => 0,
            Cmd::Batch(cmds) => cmds.iter().map(Cmd::count).sum(),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_collapses() {
        assert!(Cmd::batch([]).is_none());
        assert!(Cmd::batch([Cmd::none(), Cmd::none()]).is_none());
        assert!(matches!(
            Cmd::batch([Cmd::none(), Cmd::msg(Msg::Noop)]),
            Cmd::Msg(Msg::Noop)
        ));
        assert!(matches!(
            Cmd::batch([Cmd::quit(), Cmd::msg(Msg::Noop)]),
            Cmd::Batch(_)
        ));
    }

    #[test]
    fn test_count_is_recursive() {
        let cmd = Cmd::Batch(vec![
            Cmd::quit(),
            Cmd::Batch(vec![Cmd::msg(Msg::Noop), Cmd::none()]),
            Cmd::task(async { Msg::Noop }),
        ]);
        assert_eq!(cmd.count(), 3);
    }

    #[tokio::test]
    async fn test_after_resolves_to_message() {
        let Cmd::Task(task) = Cmd::after(Duration::from_millis(1), Msg::Resize(3, 4)) else {
            unreachable!("Expected a task");
        };
        assert!(matches!(task.await, Msg::Resize(3, 4)));
    }
}
