//! Quit remapping at the sub-model boundary.
//!
//! Both sub-models finish their phase by returning [`Cmd::quit`]. Inside the
//! long-lived session that must not stop the program, so every command a
//! sub-model produces is passed through [`filter_quit`] before the loop sees
//! it. The sub-model's own state (its outcome or exit request) is what the
//! coordinator acts on.

use super::cmd::Cmd;
use super::msg::Msg;

/// Rewrite every terminate signal in `cmd` into [`Msg::Noop`].
///
/// Batches, including batches produced later by a task, are filtered
/// recursively.
#[must_use]
pub fn filter_quit(cmd: Cmd) -> Cmd {
    match cmd {
        Cmd::None => Cmd::None,
        Cmd::Msg(msg) => Cmd::Msg(filter_msg(msg)),
        Cmd::Batch(cmds) => Cmd::Batch(cmds.into_iter().map(filter_quit).collect()),
        Cmd::Task(task) => Cmd::task(async move { filter_msg(task.await) }),
    }
}

fn filter_msg(msg: Msg) -> Msg {
    match msg {
        Msg::Quit => Msg::Noop,
        Msg::Batch(cmds) => Msg::Batch(cmds.into_iter().map(filter_quit).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolve a command tree into the messages it would deliver.
    async fn resolve(cmd: Cmd) -> Vec<Msg> {
        let mut out = Vec::new();
        let mut stack = vec![cmd];
        while let Some(cmd) = stack.pop() {
            match cmd {
                Cmd::None => {}
                Cmd::Msg(Msg::Batch(cmds)) | Cmd::Batch(cmds) => stack.extend(cmds),
                Cmd::Msg(m) => out.push(m),
                Cmd::Task(task) => stack.push(Cmd::Msg(task.await)),
            }
        }
        out
    }

    #[tokio::test]
    async fn test_direct_quit_becomes_noop() {
        let msgs = resolve(filter_quit(Cmd::quit())).await;
        assert_eq!(msgs.len(), 1);
        assert!(matches!(msgs[0], Msg::Noop));
    }

    #[tokio::test]
    async fn test_task_resolving_to_quit_becomes_noop() {
        let cmd = filter_quit(Cmd::task(async { Msg::Quit }));
        let msgs = resolve(cmd).await;
        assert!(msgs.iter().all(|m| !matches!(m, Msg::Quit)));
        assert_eq!(msgs.len(), 1);
    }

    #[tokio::test]
    async fn test_nested_batches_are_filtered() {
        let inner = Msg::Batch(vec![Cmd::quit(), Cmd::msg(Msg::Resize(1, 1))]);
        let cmd = filter_quit(Cmd::Batch(vec![
            Cmd::task(async move { inner }),
            Cmd::Batch(vec![Cmd::quit()]),
        ]));

        let msgs = resolve(cmd).await;
        assert_eq!(msgs.len(), 3);
        assert!(msgs.iter().all(|m| !matches!(m, Msg::Quit)));
        assert!(msgs.iter().any(|m| matches!(m, Msg::Resize(1, 1))));
    }

    #[tokio::test]
    async fn test_other_messages_pass_through() {
        let msgs = resolve(filter_quit(Cmd::msg(Msg::RuntimeDone { epoch: 7 }))).await;
        assert!(matches!(msgs[0], Msg::RuntimeDone { epoch: 7 }));
    }
}
