//! Blocking facade over the session loop.

use std::sync::{Mutex, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};

use crossterm::event::Event;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error};

use super::context::{with_cancel, CancelHandle, Context};
use super::coordinator::Coordinator;
use super::event::{Phase, RuntimeExit, SessionEvent};
use super::program::{self, Wiring};
use crate::configurator::{ConfiguratorOptions, SelectedMode};
use crate::dashboard::RuntimeOptions;
use crate::error::{Result, SessionError};
use crate::tui::{spawn_input_reader, Msg, Surface};

/// Capacity of the event channel between the loop and the handle.
pub const EVENT_BUFFER: usize = 4;

/// Configures and starts a [`Session`].
#[derive(Debug)]
pub struct SessionBuilder {
    options: ConfiguratorOptions,
    context: Context,
    headless: Option<(u16, u16)>,
}

impl SessionBuilder {
    /// Process-level context; its cancellation ends the session.
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Render into an in-memory buffer instead of the terminal.
    #[must_use]
    pub fn headless(mut self, columns: u16, rows: u16) -> Self {
        self.headless = Some((columns, rows));
        self
    }

    /// Build the coordinator, take over the surface and start the loop.
    ///
    /// Construction failures are returned here and never as events.
    pub fn start(self) -> Result<Session> {
        let coordinator = Coordinator::new(self.options)?;

        let surface = match self.headless {
            Some((columns, rows)) => Surface::headless(columns, rows),
            None => Surface::terminal(),
        }
        .map_err(|e| anyhow::Error::new(e).context("failed to set up the terminal"))?;
        let interactive = surface.is_interactive();
        let (columns, rows) = surface.size().unwrap_or((80, 24));
        let coordinator = coordinator.with_size(columns, rows);

        let (mailbox, inbox) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (phase_tx, phase) = watch::channel(coordinator.phase());
        let (screen_tx, screen) = watch::channel(String::new());
        let (done_tx, done) = watch::channel(false);
        let (close, close_ctx) = with_cancel();

        if interactive {
            spawn_input_reader(mailbox.clone())
                .map_err(|e| anyhow::Error::new(e).context("failed to start input reader"))?;
        }

        let wiring = Wiring {
            mailbox: mailbox.clone(),
            inbox,
            events: events_tx,
            phase: phase_tx,
            screen: screen_tx,
            context: self.context,
            close: close_ctx,
        };

        let thread = thread::Builder::new()
            .name("tui-session".to_string())
            .spawn(move || {
                let _done = DoneGuard(done_tx);
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build();
                match runtime {
                    Ok(runtime) => runtime.block_on(program::run(coordinator, surface, wiring)),
                    Err(e) => error!("Failed to start session runtime: {}", e),
                }
            })
            .map_err(|e| anyhow::Error::new(e).context("failed to spawn session thread"))?;

        Ok(Session {
            mailbox,
            events: Mutex::new(events),
            phase,
            screen,
            done,
            close,
            thread: Mutex::new(Some(thread)),
            interactive,
        })
    }
}

/// Marks the session done when the loop thread ends, even by panic.
struct DoneGuard(watch::Sender<bool>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.0.send_replace(true);
    }
}

/// Handle to a running session.
///
/// Waits block the calling thread and must not be called from inside an
/// async runtime. Only one wait may be in progress at a time; a concurrent
/// wait fails with [`SessionError::WaitInProgress`].
pub struct Session {
    mailbox: mpsc::UnboundedSender<Msg>,
    events: Mutex<mpsc::Receiver<SessionEvent>>,
    phase: watch::Receiver<Phase>,
    screen: watch::Receiver<String>,
    done: watch::Receiver<bool>,
    close: CancelHandle,
    thread: Mutex<Option<JoinHandle<()>>>,
    interactive: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase())
            .field("done", &self.is_done())
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl Session {
    /// Start configuring a session.
    #[must_use]
    pub fn builder(options: ConfiguratorOptions) -> SessionBuilder {
        SessionBuilder {
            options,
            context: Context::background(),
            headless: None,
        }
    }

    /// Block until the wizard picks a mode.
    pub fn wait_for_mode(&self) -> Result<SelectedMode> {
        self.wait(|event| match event {
            SessionEvent::ModeSelected(mode) => Some(Ok(mode)),
            SessionEvent::Exit => Some(Err(SessionError::UserQuit)),
            SessionEvent::Error(e) => Some(Err(e)),
            other => {
                debug!("Skipping {} event while waiting for a mode", other.kind());
                None
            }
        })
    }

    /// Ask the session to show the dashboard. Does not wait.
    pub fn activate_runtime(&self, options: RuntimeOptions) {
        if self.mailbox.send(Msg::ActivateRuntime(options)).is_err() {
            debug!("Session loop gone, activation dropped");
        }
    }

    /// Block until the runtime phase ends.
    ///
    /// Returns [`RuntimeExit::Reconfigure`] when the user went back to the
    /// wizard and [`SessionError::RuntimeDisconnected`] when the live
    /// connection ended; the session is still usable after both.
    pub fn wait_for_runtime_exit(&self) -> Result<RuntimeExit> {
        self.wait(|event| match event {
            SessionEvent::Reconfigure => Some(Ok(RuntimeExit::Reconfigure)),
            SessionEvent::RuntimeDisconnected => Some(Err(SessionError::RuntimeDisconnected)),
            SessionEvent::Exit => Some(Err(SessionError::UserQuit)),
            SessionEvent::Error(e) => Some(Err(e)),
            other => {
                debug!("Skipping {} event while waiting for runtime exit", other.kind());
                None
            }
        })
    }

    fn wait<T, F>(&self, mut accept: F) -> Result<T>
    where
        F: FnMut(SessionEvent) -> Option<Result<T>>,
    {
        let mut events = match self.events.try_lock() {
            Ok(events) => events,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(SessionError::WaitInProgress),
        };

        loop {
            let Some(event) = events.blocking_recv() else {
                return Err(SessionError::SessionClosed);
            };
            if let Some(result) = accept(event) {
                return result;
            }
        }
    }

    /// Stop the loop, wait for it, and restore the terminal.
    ///
    /// Safe to call repeatedly and from several threads; cleanup runs once.
    pub fn close(&self) {
        self.close.cancel();

        let mut thread = self.thread.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(handle) = thread.take() else {
            return;
        };

        // The loop thread owns the terminal guard, so joining it also puts
        // the terminal back.
        if handle.join().is_err() {
            error!("Session loop panicked");
        }
        debug!("Session closed");
    }

    /// Receiver that turns `true` once the loop has stopped.
    #[must_use]
    pub fn done(&self) -> watch::Receiver<bool> {
        self.done.clone()
    }

    /// Whether the loop has stopped.
    #[must_use]
    pub fn is_done(&self) -> bool {
        *self.done.borrow()
    }

    /// Last phase published by the loop.
    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Text of the last headless frame. Empty for a real terminal.
    #[must_use]
    pub fn screen(&self) -> String {
        self.screen.borrow().clone()
    }

    /// Feed a terminal event, as the input reader would.
    pub fn send_input(&self, event: Event) {
        let msg = Msg::from(event);
        if matches!(msg, Msg::Noop) {
            return;
        }
        if self.mailbox.send(msg).is_err() {
            debug!("Session loop gone, input dropped");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
