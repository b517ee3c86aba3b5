//! The session event loop.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::context::Context;
use super::coordinator::{Coordinator, Step};
use super::event::{Phase, SessionEvent};
use crate::tui::{Cmd, Msg, Surface};

/// Channels and signals the loop talks through.
pub(crate) struct Wiring {
    pub mailbox: mpsc::UnboundedSender<Msg>,
    pub inbox: mpsc::UnboundedReceiver<Msg>,
    pub events: mpsc::Sender<SessionEvent>,
    pub phase: watch::Sender<Phase>,
    pub screen: watch::Sender<String>,
    pub context: Context,
    pub close: Context,
}

/// Run `coordinator` until a terminal transition.
pub(crate) async fn run(mut coordinator: Coordinator, mut surface: Surface, wiring: Wiring) {
    let Wiring {
        mailbox,
        mut inbox,
        events,
        phase,
        screen,
        context,
        close,
    } = wiring;

    execute(coordinator.init(), &mailbox);
    render(&coordinator, &mut surface, &screen);

    loop {
        let msg = tokio::select! {
            biased;
            _ = context.cancelled() => Msg::Cancelled,
            _ = close.cancelled() => Msg::Cancelled,
            msg = inbox.recv() => msg.unwrap_or(Msg::Cancelled),
        };

        if let Msg::Resize(columns, rows) = msg {
            surface.resize(columns, rows);
        }

        let Step {
            coordinator: next,
            cmd,
            event,
        } = coordinator.update(msg);
        coordinator = next;

        phase.send_if_modified(|current| {
            let changed = *current != coordinator.phase();
            *current = coordinator.phase();
            changed
        });

        if let Some(event) = event {
            let terminal = event.is_terminal();
            emit(&events, event);
            if terminal {
                break;
            }
        }

        execute(cmd, &mailbox);
        render(&coordinator, &mut surface, &screen);
    }

    info!("Session loop finished in phase {}", coordinator.phase());
}

/// Hand `cmd` to the runtime. Results come back through `mailbox`.
fn execute(cmd: Cmd, mailbox: &mpsc::UnboundedSender<Msg>) {
    match cmd {
        Cmd::None => {}
        Cmd::Msg(msg) => {
            if mailbox.send(msg).is_err() {
                debug!("Mailbox closed, dropping message");
            }
        }
        Cmd::Batch(cmds) => {
            for cmd in cmds {
                execute(cmd, mailbox);
            }
        }
        Cmd::Task(task) => {
            let mailbox = mailbox.clone();
            tokio::spawn(async move {
                let msg = task.await;
                // The loop may be gone by now.
                let _ = mailbox.send(msg);
            });
        }
    }
}

fn emit(events: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    debug!("Session event: {}", event.kind());
    match events.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            warn!("Event buffer full, dropping {} event", event.kind());
        }
        Err(mpsc::error::TrySendError::Closed(event)) => {
            debug!("No session handle listening, dropping {} event", event.kind());
        }
    }
}

fn render(coordinator: &Coordinator, surface: &mut Surface, screen: &watch::Sender<String>) {
    let drawn = surface.draw(|frame| {
        let area = frame.area();
        coordinator.view(frame, area);
    });
    if let Err(e) = drawn {
        warn!("Failed to draw: {}", e);
        return;
    }
    if let Some(contents) = surface.contents() {
        screen.send_replace(contents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::{ConfiguratorOptions, MemoryClientConfigStore};
    use crate::prefs::{Preferences, PreferencesStore};
    use crate::session::with_cancel;
    use crossterm::event::{KeyCode, KeyEvent};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn coordinator() -> Coordinator {
        let prefs = Arc::new(PreferencesStore::in_memory(Preferences::default()));
        let store = Arc::new(MemoryClientConfigStore::with_entries([("Lab", "/cfg/lab.toml")]));
        Coordinator::new(ConfiguratorOptions::new(prefs).with_client_configs(store))
            .unwrap()
            .with_size(60, 20)
    }

    struct Harness {
        mailbox: mpsc::UnboundedSender<Msg>,
        events: mpsc::Receiver<SessionEvent>,
        phase: watch::Receiver<Phase>,
        screen: watch::Receiver<String>,
        cancel: crate::session::CancelHandle,
        task: tokio::task::JoinHandle<()>,
    }

    fn start() -> Harness {
        let (mailbox, inbox) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::channel(4);
        let (phase_tx, phase) = watch::channel(Phase::Configuring);
        let (screen_tx, screen) = watch::channel(String::new());
        let (cancel, context) = with_cancel();
        let wiring = Wiring {
            mailbox: mailbox.clone(),
            inbox,
            events: events_tx,
            phase: phase_tx,
            screen: screen_tx,
            context,
            close: Context::background(),
        };
        let surface = Surface::headless(60, 20).unwrap();
        let task = tokio::spawn(run(coordinator(), surface, wiring));
        Harness {
            mailbox,
            events,
            phase,
            screen,
            cancel,
            task,
        }
    }

    #[tokio::test]
    async fn test_loop_selects_mode_and_exits_on_cancel() {
        let mut h = start();
        for _ in 0..2 {
            h.mailbox.send(Msg::Key(KeyEvent::from(KeyCode::Enter))).unwrap();
        }

        let event = timeout(Duration::from_secs(1), h.events.recv()).await.unwrap();
        assert!(matches!(event, Some(SessionEvent::ModeSelected(_))));
        h.phase
            .wait_for(|p| *p == Phase::WaitingForRuntime)
            .await
            .unwrap();
        assert!(h.screen.borrow().contains("Starting client"));

        h.cancel.cancel();
        let event = timeout(Duration::from_secs(1), h.events.recv()).await.unwrap();
        assert!(matches!(event, Some(SessionEvent::Exit)));
        timeout(Duration::from_secs(1), h.task).await.unwrap().unwrap();

        // The loop dropped its sender.
        assert!(h.events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_injected_quit_ends_loop() {
        let mut h = start();
        h.mailbox.send(Msg::Quit).unwrap();
        let event = timeout(Duration::from_secs(1), h.events.recv()).await.unwrap();
        assert!(matches!(event, Some(SessionEvent::Exit)));
        timeout(Duration::from_secs(1), h.task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_batch_message_runs_commands() {
        let mut h = start();
        h.mailbox
            .send(Msg::Batch(vec![
                Cmd::msg(Msg::Key(KeyEvent::from(KeyCode::Enter))),
                Cmd::after(
                    Duration::from_millis(10),
                    Msg::Key(KeyEvent::from(KeyCode::Enter)),
                ),
            ]))
            .unwrap();

        let event = timeout(Duration::from_secs(1), h.events.recv()).await.unwrap();
        assert!(matches!(event, Some(SessionEvent::ModeSelected(_))));
        h.cancel.cancel();
    }
}
