//! Phase state machine.
//!
//! | From              | Trigger                       | To                |
//! |-------------------|-------------------------------|-------------------|
//! | Configuring       | wizard picked a mode          | WaitingForRuntime |
//! | Configuring       | wizard quit or failed         | stopped           |
//! | WaitingForRuntime | `ActivateRuntime`             | Runtime           |
//! | Runtime           | dashboard exit                | stopped           |
//! | Runtime           | dashboard reconfigure         | Configuring       |
//! | Runtime           | `RuntimeDone` of this epoch   | WaitingForRuntime |
//! | any               | cancellation                  | stopped           |

use std::sync::Arc;

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info, warn};

use super::event::{Phase, SessionEvent};
use crate::configurator::{Configurator, ConfiguratorOptions, SelectedMode};
use crate::dashboard::{Dashboard, RuntimeOptions, RuntimeRequest};
use crate::error::SessionError;
use crate::prefs::PreferencesStore;
use crate::sequence::SequenceGuard;
use crate::tui::{filter_quit, Cmd, Msg, Palette, SubModel};

/// Result of feeding one message to the [`Coordinator`].
#[derive(Debug)]
pub struct Step {
    /// State after the message.
    pub coordinator: Coordinator,
    /// Filtered follow-up work.
    pub cmd: Cmd,
    /// Event for the session handle, if the message produced one.
    pub event: Option<SessionEvent>,
}

/// Owner of the phase and of the active sub-model.
pub struct Coordinator {
    phase: Phase,
    configurator: Configurator,
    dashboard: Option<Dashboard>,
    options: ConfiguratorOptions,
    preferences: Arc<PreferencesStore>,
    size: (u16, u16),
    epoch: SequenceGuard,
    wizards: SequenceGuard,
    selected: Option<SelectedMode>,
    stopped: bool,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("phase", &self.phase)
            .field("configurator", &self.configurator.screen_name())
            .field("epoch", &self.epoch.current())
            .field("size", &self.size)
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl Coordinator {
    /// Build a coordinator in [`Phase::Configuring`].
    ///
    /// Fails synchronously when the wizard cannot be built.
    pub fn new(options: ConfiguratorOptions) -> Result<Self, SessionError> {
        let wizards = SequenceGuard::new();
        let configurator = Configurator::new(options.clone())?.with_generation(wizards.current());
        Ok(Self {
            phase: Phase::Configuring,
            configurator,
            dashboard: None,
            preferences: Arc::clone(&options.preferences),
            options,
            size: (0, 0),
            epoch: SequenceGuard::new(),
            wizards,
            selected: None,
            stopped: false,
        })
    }

    /// Set the initial terminal size.
    #[must_use]
    pub fn with_size(mut self, columns: u16, rows: u16) -> Self {
        self.size = (columns, rows);
        self
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of the current (or last) runtime activation.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.current()
    }

    /// Last known terminal size.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Whether a terminal transition happened.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The wizard. Present in every phase.
    #[must_use]
    pub fn configurator(&self) -> &Configurator {
        &self.configurator
    }

    /// The dashboard, only in [`Phase::Runtime`].
    #[must_use]
    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    /// Initial work of the wizard.
    pub fn init(&self) -> Cmd {
        filter_quit(self.configurator.init())
    }

    /// Process one message.
    pub fn update(mut self, msg: Msg) -> Step {
        if self.stopped {
            debug!("Coordinator stopped, ignoring {:?}", msg);
            return self.step(Cmd::none(), None);
        }

        match msg {
            Msg::Cancelled => {
                info!("Session cancelled");
                self.stop(SessionEvent::Exit)
            }
            Msg::Quit => {
                // Sub-model quits are filtered, so this came from outside.
                debug!("Quit reached the coordinator");
                self.stop(SessionEvent::Exit)
            }
            Msg::Noop => self.step(Cmd::none(), None),
            Msg::Batch(cmds) => self.step(Cmd::batch(cmds), None),
            Msg::Resize(columns, rows) => {
                self.size = (columns, rows);
                self.route(Msg::Resize(columns, rows))
            }
            Msg::ActivateRuntime(options) => self.activate(options),
            Msg::RuntimeDone { epoch } => self.runtime_done(epoch),
            Msg::Dashboard(tick) if !self.owns_tick(tick.epoch()) => {
                debug!("Dropping tick of inactive activation {}", tick.epoch());
                self.step(Cmd::none(), None)
            }
            Msg::Configurator(msg)
                if msg
                    .generation()
                    .is_some_and(|g| g != self.configurator.generation()) =>
            {
                debug!("Dropping timer of a replaced configurator");
                self.step(Cmd::none(), None)
            }
            other => self.route(other),
        }
    }

    /// Whether a dashboard tick from activation `epoch` is for the live dashboard.
    fn owns_tick(&self, epoch: u64) -> bool {
        self.phase == Phase::Runtime
            && self.dashboard.as_ref().is_some_and(|d| d.epoch() == epoch)
    }

    fn step(self, cmd: Cmd, event: Option<SessionEvent>) -> Step {
        Step {
            coordinator: self,
            cmd,
            event,
        }
    }

    fn stop(mut self, event: SessionEvent) -> Step {
        self.stopped = true;
        self.step(Cmd::none(), Some(event))
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("Phase {} -> {}", self.phase, phase);
            self.phase = phase;
        }
    }

    fn activate(mut self, options: RuntimeOptions) -> Step {
        if self.phase != Phase::WaitingForRuntime {
            warn!("Ignoring runtime activation while {}", self.phase);
            return self.step(Cmd::none(), None);
        }

        let epoch = self.epoch.advance();
        info!("Activating runtime {} (epoch {})", options.mode, epoch);

        let dashboard = Dashboard::new(options, Arc::clone(&self.preferences), epoch);
        let (columns, rows) = self.size;
        let (dashboard, resize_cmd) = dashboard.update(Msg::Resize(columns, rows));
        let cmd = Cmd::batch([filter_quit(dashboard.init()), filter_quit(resize_cmd)]);

        self.dashboard = Some(dashboard);
        self.set_phase(Phase::Runtime);
        self.step(cmd, None)
    }

    fn runtime_done(mut self, epoch: u64) -> Step {
        if self.phase != Phase::Runtime || !self.epoch.is_current(epoch) {
            debug!(
                "Ignoring stale runtime notification (epoch {}, current {})",
                epoch,
                self.epoch.current()
            );
            return self.step(Cmd::none(), None);
        }

        info!("Runtime {} disconnected", epoch);
        self.dashboard = None;
        self.set_phase(Phase::WaitingForRuntime);
        self.step(Cmd::none(), Some(SessionEvent::RuntimeDisconnected))
    }

    fn route(mut self, msg: Msg) -> Step {
        match self.phase {
            Phase::Configuring => {
                let (mut configurator, cmd) = self.configurator.update(msg);
                let outcome = configurator.take_outcome();
                self.configurator = configurator;
                let cmd = filter_quit(cmd);

                match outcome {
                    None => self.step(cmd, None),
                    Some(Ok(mode)) => {
                        self.selected = Some(mode.clone());
                        self.set_phase(Phase::WaitingForRuntime);
                        self.step(cmd, Some(SessionEvent::ModeSelected(mode)))
                    }
                    Some(Err(SessionError::UserQuit)) => self.stop(SessionEvent::Exit),
                    Some(Err(e)) => self.stop(SessionEvent::Error(e)),
                }
            }
            Phase::WaitingForRuntime => {
                if !matches!(msg, Msg::Resize(..)) {
                    debug!("No active sub-model, dropping {:?}", msg);
                }
                self.step(Cmd::none(), None)
            }
            Phase::Runtime => {
                let Some(dashboard) = self.dashboard.take() else {
                    warn!("Runtime phase without a dashboard");
                    self.set_phase(Phase::WaitingForRuntime);
                    return self.step(Cmd::none(), None);
                };

                let (dashboard, cmd) = dashboard.update(msg);
                let cmd = filter_quit(cmd);
                match dashboard.request() {
                    None => {
                        self.dashboard = Some(dashboard);
                        self.step(cmd, None)
                    }
                    Some(RuntimeRequest::Exit) => {
                        self.dashboard = Some(dashboard);
                        self.stop(SessionEvent::Exit)
                    }
                    Some(RuntimeRequest::Reconfigure) => self.reconfigure(cmd),
                }
            }
        }
    }

    fn reconfigure(mut self, cmd: Cmd) -> Step {
        match Configurator::new(self.options.for_reconfigure()) {
            Ok(configurator) => {
                let configurator = configurator.with_generation(self.wizards.advance());
                info!("Returning to the configurator");
                let init = filter_quit(configurator.init());
                self.configurator = configurator;
                self.selected = None;
                self.set_phase(Phase::Configuring);
                self.step(Cmd::batch([cmd, init]), Some(SessionEvent::Reconfigure))
            }
            Err(e) => self.stop(SessionEvent::Error(e)),
        }
    }

    /// Render the active sub-model.
    pub fn view(&self, frame: &mut Frame, area: Rect) {
        match (self.phase, &self.dashboard) {
            (Phase::Runtime, Some(dashboard)) => dashboard.view(frame, area),
            (Phase::Configuring, _) => self.configurator.view(frame, area),
            _ => self.waiting_view(frame, area),
        }
    }

    fn waiting_view(&self, frame: &mut Frame, area: Rect) {
        let palette = Palette::for_theme(self.preferences.preferences().theme);
        let target = match &self.selected {
            Some(mode) => format!("Starting {}", mode),
            None => "Starting".to_string(),
        };

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(target, palette.title())),
            Line::from(Span::styled(
                "Waiting for the connection to come up",
                Style::default().fg(palette.muted),
            )),
        ];
        let widget = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted)),
        );
        frame.render_widget(widget, area);
    }
}
