//! Configurator state machine.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use tracing::{debug, info, warn};

use super::{
    ClientConfigEntry, ClientConfigStore, ConfiguratorMsg, ConfiguratorOptions, OperatingMode,
    SelectedMode, ServerConfigManager,
};
use crate::error::SessionError;
use crate::prefs::{AutoSelectMode, Preferences};
use crate::sequence::SequenceGuard;
use crate::tui::{is_interrupt, Cmd, Msg, SubModel};

/// Quiet period after the last typed or pasted character before Enter
/// submits again.
pub const PASTE_SETTLE: Duration = Duration::from_millis(120);

/// Wizard screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Screen {
    /// Pick client or server.
    Mode { selected: usize },
    /// Pick a stored client configuration.
    Clients {
        entries: Vec<ClientConfigEntry>,
        selected: usize,
        confirm_delete: bool,
    },
    /// Type or paste a new client configuration.
    NewClient { input: String, settling: bool },
}

/// Setup wizard sub-model.
///
/// The wizard finishes exactly once: it stores its outcome, returns
/// [`Cmd::quit`] and ignores everything that arrives afterwards.
pub struct Configurator {
    clients: Arc<dyn ClientConfigStore>,
    server: Option<Arc<dyn ServerConfigManager>>,
    options: ConfiguratorOptions,
    pub(super) screen: Screen,
    generation: u64,
    paste: SequenceGuard,
    pub(super) status: Option<String>,
    pub(super) prefs: Arc<Preferences>,
    outcome: Option<Result<SelectedMode, SessionError>>,
    finished: bool,
}

impl Configurator {
    /// Build a wizard from `options`.
    ///
    /// Fails when the client configuration store is missing, or when server
    /// mode is enabled without a server configuration manager.
    pub fn new(options: ConfiguratorOptions) -> Result<Self, SessionError> {
        let clients = options
            .client_configs
            .clone()
            .ok_or(SessionError::MissingDependency("client config store"))?;

        let server = options.server_config.clone();
        if options.server_supported && server.is_none() {
            return Err(SessionError::MissingDependency("server config manager"));
        }

        let prefs = options.preferences.preferences();
        Ok(Self {
            clients,
            server,
            options,
            screen: Screen::Mode { selected: 0 },
            generation: 0,
            paste: SequenceGuard::new(),
            status: None,
            prefs,
            outcome: None,
            finished: false,
        })
    }

    /// Number this wizard instance; its timers carry it.
    #[must_use]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Instance number set by [`with_generation`](Self::with_generation).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Modes offered on the first screen.
    #[must_use]
    pub fn modes(&self) -> Vec<OperatingMode> {
        if self.options.server_supported {
            vec![OperatingMode::Client, OperatingMode::Server]
        } else {
            vec![OperatingMode::Client]
        }
    }

    /// Short name of the visible screen.
    #[must_use]
    pub fn screen_name(&self) -> &'static str {
        match self.screen {
            Screen::Mode { .. } => "mode",
            Screen::Clients { .. } => "clients",
            Screen::NewClient { .. } => "new-client",
        }
    }

    /// Whether the wizard has produced an outcome.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take the outcome, leaving `None` behind.
    pub fn take_outcome(&mut self) -> Option<Result<SelectedMode, SessionError>> {
        self.outcome.take()
    }

    fn finish(&mut self, outcome: Result<SelectedMode, SessionError>) -> Cmd {
        match &outcome {
            Ok(mode) => info!("Configurator selected {}", mode),
            Err(SessionError::UserQuit) => debug!("Configurator quit by user"),
            Err(e) => warn!("Configurator failed: {}", e),
        }
        self.paste.advance();
        self.finished = true;
        self.outcome = Some(outcome);
        Cmd::quit()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Cmd {
        match self.screen {
            Screen::Mode { .. } => self.mode_key(key),
            Screen::Clients { .. } => self.clients_key(key),
            Screen::NewClient { .. } => self.new_client_key(key),
        }
    }

    fn mode_key(&mut self, key: KeyEvent) -> Cmd {
        let modes = self.modes();
        let Screen::Mode { selected } = &mut self.screen else {
            return Cmd::none();
        };

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                *selected = selected.saturating_sub(1);
                Cmd::none()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if *selected + 1 < modes.len() {
                    *selected += 1;
                }
                Cmd::none()
            }
            KeyCode::Enter => {
                let index = (*selected).min(modes.len().saturating_sub(1));
                match modes.get(index) {
                    Some(&mode) => self.choose(mode),
                    None => Cmd::none(),
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => self.finish(Err(SessionError::UserQuit)),
            _ => Cmd::none(),
        }
    }

    fn choose(&mut self, mode: OperatingMode) -> Cmd {
        self.status = None;
        match mode {
            OperatingMode::Client => self.open_clients(None),
            OperatingMode::Server => {
                let ensured = self.server.as_ref().map(|server| server.ensure());
                match ensured {
                    Some(Ok(config)) => self.finish(Ok(SelectedMode::Server { config })),
                    Some(Err(e)) => self.finish(Err(anyhow::Error::new(e)
                        .context("failed to prepare server configuration")
                        .into())),
                    None => {
                        self.status = Some("Server mode is not available".to_string());
                        Cmd::none()
                    }
                }
            }
        }
    }

    /// Show the client list, focusing `focus` or the remembered entry.
    fn open_clients(&mut self, focus: Option<&Path>) -> Cmd {
        match self.clients.list() {
            Ok(entries) => {
                let target: Option<PathBuf> = focus
                    .map(Path::to_path_buf)
                    .or_else(|| self.prefs.auto_select_client_config.clone());
                let selected = target
                    .and_then(|t| entries.iter().position(|e| e.path == t))
                    .unwrap_or(0);
                self.screen = Screen::Clients {
                    entries,
                    selected,
                    confirm_delete: false,
                };
                Cmd::none()
            }
            Err(e) => self.finish(Err(anyhow::Error::new(e)
                .context("failed to list client configurations")
                .into())),
        }
    }

    fn clients_key(&mut self, key: KeyEvent) -> Cmd {
        let Screen::Clients {
            entries,
            selected,
            confirm_delete,
        } = &mut self.screen
        else {
            return Cmd::none();
        };

        if *confirm_delete {
            *confirm_delete = false;
            let target = entries.get(*selected).cloned();
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'))
                && let Some(entry) = target
            {
                return self.delete_client(entry);
            }
            self.status = None;
            return Cmd::none();
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                *selected = selected.saturating_sub(1);
                Cmd::none()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if *selected + 1 < entries.len() {
                    *selected += 1;
                }
                Cmd::none()
            }
            KeyCode::Enter => match entries.get(*selected).cloned() {
                Some(entry) => self.select_client(entry),
                None => {
                    self.status = Some("No client configurations yet, press n to add one".into());
                    Cmd::none()
                }
            },
            KeyCode::Char('n') => {
                self.paste.advance();
                self.screen = Screen::NewClient {
                    input: String::new(),
                    settling: false,
                };
                self.status = None;
                Cmd::none()
            }
            KeyCode::Char('d') => {
                if let Some(entry) = entries.get(*selected) {
                    let prompt = format!("Delete {}? (y/N)", entry.name);
                    *confirm_delete = true;
                    self.status = Some(prompt);
                }
                Cmd::none()
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
                self.screen = Screen::Mode { selected: 0 };
                self.status = None;
                Cmd::none()
            }
            KeyCode::Char('q') => self.finish(Err(SessionError::UserQuit)),
            _ => Cmd::none(),
        }
    }

    fn select_client(&mut self, entry: ClientConfigEntry) -> Cmd {
        if let Err(e) = self.clients.select(&entry.path) {
            self.status = Some(format!("Cannot use {}: {}", entry.name, e));
            return Cmd::none();
        }

        let remembered = entry.path.clone();
        self.prefs = self
            .options
            .preferences
            .update(|p| p.auto_select_client_config = Some(remembered));
        self.finish(Ok(SelectedMode::Client { config: entry.path }))
    }

    fn delete_client(&mut self, entry: ClientConfigEntry) -> Cmd {
        match self.clients.delete(&entry.path) {
            Ok(()) => {
                info!("Deleted client configuration '{}'", entry.name);
                if self.prefs.auto_select_client_config.as_deref() == Some(entry.path.as_path()) {
                    self.prefs = self
                        .options
                        .preferences
                        .update(|p| p.auto_select_client_config = None);
                }
                self.status = Some(format!("Deleted {}", entry.name));
                self.open_clients(None)
            }
            Err(e) => {
                self.status = Some(format!("Failed to delete {}: {}", entry.name, e));
                Cmd::none()
            }
        }
    }

    fn new_client_key(&mut self, key: KeyEvent) -> Cmd {
        let Screen::NewClient { input, settling } = &mut self.screen else {
            return Cmd::none();
        };

        match key.code {
            KeyCode::Esc => {
                self.paste.advance();
                self.status = None;
                self.open_clients(None)
            }
            KeyCode::Enter if *settling => {
                input.push('\n');
                self.start_settle()
            }
            KeyCode::Enter => self.submit_new_client(),
            KeyCode::Backspace => {
                input.pop();
                Cmd::none()
            }
            KeyCode::Tab => {
                input.push_str("    ");
                self.start_settle()
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.push(c);
                self.start_settle()
            }
            _ => Cmd::none(),
        }
    }

    fn handle_paste(&mut self, text: &str) -> Cmd {
        let Screen::NewClient { input, .. } = &mut self.screen else {
            debug!("Ignoring paste outside the new configuration screen");
            return Cmd::none();
        };
        input.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
        self.start_settle()
    }

    /// Start a new settle round; Enter inserts newlines until it expires.
    fn start_settle(&mut self) -> Cmd {
        let seq = self.paste.advance();
        if let Screen::NewClient { settling, .. } = &mut self.screen {
            *settling = true;
        }
        Cmd::after(
            PASTE_SETTLE,
            Msg::Configurator(ConfiguratorMsg::PasteSettled {
                generation: self.generation,
                seq,
            }),
        )
    }

    fn settle(&mut self, seq: u64) {
        if !self.paste.is_current(seq) {
            debug!("Dropping stale paste-settle round {}", seq);
            return;
        }
        if let Screen::NewClient { settling, .. } = &mut self.screen {
            *settling = false;
        }
    }

    fn submit_new_client(&mut self) -> Cmd {
        let Screen::NewClient { input, .. } = &self.screen else {
            return Cmd::none();
        };
        let source = input.trim().to_string();
        if source.is_empty() {
            self.status = Some("Nothing to save".to_string());
            return Cmd::none();
        }

        match self.clients.create(&source) {
            Ok(entry) => {
                info!("Saved client configuration '{}'", entry.name);
                self.paste.advance();
                self.status = Some(format!("Saved {}", entry.name));
                self.open_clients(Some(&entry.path))
            }
            Err(e) => {
                self.status = Some(e.to_string());
                Cmd::none()
            }
        }
    }

    fn auto_select(&mut self) -> Cmd {
        if !self.options.auto_select {
            return Cmd::none();
        }

        match self.prefs.auto_select_mode {
            AutoSelectMode::None => Cmd::none(),
            AutoSelectMode::Server if self.options.server_supported => {
                self.choose(OperatingMode::Server)
            }
            AutoSelectMode::Server => {
                debug!("Server auto-select ignored, server mode unavailable");
                Cmd::none()
            }
            AutoSelectMode::Client => {
                let cmd = self.open_clients(None);
                if self.finished || !self.prefs.auto_connect {
                    return cmd;
                }
                let Some(target) = self.prefs.auto_select_client_config.clone() else {
                    return cmd;
                };

                let entry = match &self.screen {
                    Screen::Clients { entries, .. } => {
                        entries.iter().find(|e| e.path == target).cloned()
                    }
                    _ => None,
                };
                match entry {
                    Some(entry) => {
                        info!("Auto-connecting with '{}'", entry.name);
                        self.select_client(entry)
                    }
                    None => {
                        warn!("Remembered client configuration {:?} is gone", target);
                        self.status =
                            Some("Remembered configuration no longer exists".to_string());
                        cmd
                    }
                }
            }
        }
    }
}

impl SubModel for Configurator {
    fn init(&self) -> Cmd {
        if self.options.auto_select && self.prefs.auto_select_mode != AutoSelectMode::None {
            Cmd::msg(Msg::Configurator(ConfiguratorMsg::AutoSelect))
        } else {
            Cmd::none()
        }
    }

    fn update(mut self, msg: Msg) -> (Self, Cmd) {
        if self.finished {
            return (self, Cmd::none());
        }

        self.prefs = self.options.preferences.preferences();
        let cmd = match msg {
            Msg::Key(key) if is_interrupt(&key) => self.finish(Err(SessionError::UserQuit)),
            Msg::Key(key) => self.handle_key(key),
            Msg::Paste(text) => self.handle_paste(&text),
            Msg::Configurator(ConfiguratorMsg::AutoSelect) => self.auto_select(),
            Msg::Configurator(ConfiguratorMsg::PasteSettled { seq, .. }) => {
                self.settle(seq);
                Cmd::none()
            }
            _ => Cmd::none(),
        };
        (self, cmd)
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        self.render(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::{FsServerConfigManager, MemoryClientConfigStore, StoreError};
    use crate::prefs::PreferencesStore;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use tempfile::tempdir;

    const OFFICE: &str = "name = \"Office\"\nserver = \"vpn.example.com:443\"\n";

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        })
    }

    fn ctrl_c() -> Msg {
        Msg::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        })
    }

    fn prefs(edit: impl FnOnce(&mut Preferences)) -> Arc<PreferencesStore> {
        let mut p = Preferences::default();
        edit(&mut p);
        Arc::new(PreferencesStore::in_memory(p))
    }

    fn store() -> Arc<MemoryClientConfigStore> {
        Arc::new(MemoryClientConfigStore::with_entries([
            ("Office", "/cfg/office.toml"),
            ("Home", "/cfg/home.toml"),
        ]))
    }

    fn wizard(store: Arc<MemoryClientConfigStore>, prefs: Arc<PreferencesStore>) -> Configurator {
        Configurator::new(ConfiguratorOptions::new(prefs).with_client_configs(store)).unwrap()
    }

    fn feed(mut model: Configurator, msgs: impl IntoIterator<Item = Msg>) -> Configurator {
        for msg in msgs {
            model = model.update(msg).0;
        }
        model
    }

    struct FailingStore;

    impl ClientConfigStore for FailingStore {
        fn list(&self) -> Result<Vec<ClientConfigEntry>, StoreError> {
            Err(StoreError::Invalid("disk unplugged".to_string()))
        }
        fn create(&self, _source: &str) -> Result<ClientConfigEntry, StoreError> {
            Err(StoreError::Invalid("read-only".to_string()))
        }
        fn delete(&self, path: &Path) -> Result<(), StoreError> {
            Err(StoreError::NotFound(path.to_path_buf()))
        }
    }

    #[test]
    fn test_missing_dependencies_fail_construction() {
        let options = ConfiguratorOptions::new(prefs(|_| {}));
        assert!(matches!(
            Configurator::new(options.clone()),
            Err(SessionError::MissingDependency("client config store"))
        ));

        let options = options.with_client_configs(store()).server_supported(true);
        assert!(matches!(
            Configurator::new(options),
            Err(SessionError::MissingDependency("server config manager"))
        ));
    }

    #[test]
    fn test_select_client_config() {
        let prefs = prefs(|_| {});
        let model = wizard(store(), Arc::clone(&prefs));
        assert_eq!(model.screen_name(), "mode");

        // Entries are listed by name, so Home comes first.
        let (mut model, cmd) = feed(model, [key(KeyCode::Enter), key(KeyCode::Down)])
            .update(key(KeyCode::Enter));

        assert!(matches!(cmd, Cmd::Msg(Msg::Quit)));
        assert!(model.is_finished());
        assert_eq!(
            model.take_outcome().unwrap().unwrap(),
            SelectedMode::Client {
                config: PathBuf::from("/cfg/office.toml")
            }
        );
        assert_eq!(
            prefs.preferences().auto_select_client_config,
            Some(PathBuf::from("/cfg/office.toml"))
        );
    }

    #[test]
    fn test_quit_keys_on_first_screen() {
        for msg in [key(KeyCode::Char('q')), key(KeyCode::Esc), ctrl_c()] {
            let (mut model, cmd) = wizard(store(), prefs(|_| {})).update(msg);
            assert!(matches!(cmd, Cmd::Msg(Msg::Quit)));
            assert!(matches!(
                model.take_outcome(),
                Some(Err(SessionError::UserQuit))
            ));
        }
    }

    #[test]
    fn test_esc_on_client_list_goes_back() {
        let model = feed(
            wizard(store(), prefs(|_| {})),
            [key(KeyCode::Enter), key(KeyCode::Esc)],
        );
        assert_eq!(model.screen_name(), "mode");
        assert!(!model.is_finished());
    }

    #[test]
    fn test_finished_wizard_ignores_input() {
        let model = feed(wizard(store(), prefs(|_| {})), [key(KeyCode::Char('q'))]);
        let (model, cmd) = model.update(key(KeyCode::Enter));
        assert!(cmd.is_none());
        assert_eq!(model.screen_name(), "mode");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let store = store();
        let model = wizard(Arc::clone(&store), prefs(|_| {}));
        let model = feed(model, [key(KeyCode::Enter), key(KeyCode::Char('d'))]);
        assert!(model.status.as_deref().unwrap().starts_with("Delete Home?"));

        // Anything but y cancels.
        let model = feed(model, [key(KeyCode::Char('n'))]);
        assert_eq!(store.list().unwrap().len(), 2);
        assert!(model.status.is_none());

        let model = feed(model, [key(KeyCode::Char('d')), key(KeyCode::Char('y'))]);
        let names: Vec<_> = store.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Office"]);
        assert_eq!(model.status.as_deref(), Some("Deleted Home"));
        assert_eq!(model.screen_name(), "clients");
    }

    #[test]
    fn test_listing_failure_is_fatal() {
        let options =
            ConfiguratorOptions::new(prefs(|_| {})).with_client_configs(Arc::new(FailingStore));
        let model = Configurator::new(options).unwrap();

        let (mut model, cmd) = model.update(key(KeyCode::Enter));
        assert!(matches!(cmd, Cmd::Msg(Msg::Quit)));
        let err = model.take_outcome().unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Other(_)));
        assert!(err.to_string().contains("client configurations"));
    }

    #[test]
    fn test_server_mode_ensures_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let options = ConfiguratorOptions::new(prefs(|_| {}))
            .with_client_configs(store())
            .with_server_config(Arc::new(FsServerConfigManager::new(path.clone())));

        let mut model = feed(
            Configurator::new(options).unwrap(),
            [key(KeyCode::Down), key(KeyCode::Enter)],
        );

        assert_eq!(
            model.take_outcome().unwrap().unwrap(),
            SelectedMode::Server { config: path.clone() }
        );
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_paste_then_enter_inserts_newline_until_settled() {
        let store = store();
        let model = feed(
            wizard(Arc::clone(&store), prefs(|_| {})),
            [key(KeyCode::Enter), key(KeyCode::Char('n'))],
        );
        assert_eq!(model.screen_name(), "new-client");

        let (model, first) = model.update(Msg::Paste("name = \"Lab\"".to_string()));
        assert!(matches!(first, Cmd::Task(_)));
        let stale_seq = model.paste.current();

        // Enter while settling continues the text.
        let (model, _) = model.update(key(KeyCode::Enter));
        let (model, second) = model.update(Msg::Paste("server = \"lab:443\"".to_string()));

        let Screen::NewClient { input, settling } = &model.screen else {
            panic!("left the input screen");
        };
        assert_eq!(input, "name = \"Lab\"\nserver = \"lab:443\"");
        assert!(*settling);

        // The first timer is stale and does not end settling.
        let model = feed(
            model,
            [Msg::Configurator(ConfiguratorMsg::PasteSettled {
                generation: 0,
                seq: stale_seq,
            })],
        );
        assert!(matches!(model.screen, Screen::NewClient { settling: true, .. }));

        let Cmd::Task(task) = second else {
            panic!("expected a settle timer");
        };
        let settled = task.await;
        let model = feed(model, [settled, key(KeyCode::Enter)]);

        assert_eq!(model.screen_name(), "clients");
        assert_eq!(model.status.as_deref(), Some("Saved Lab"));
        assert_eq!(store.list().unwrap().len(), 3);
    }

    #[test]
    fn test_invalid_new_config_keeps_input() {
        let model = feed(
            wizard(store(), prefs(|_| {})),
            [key(KeyCode::Enter), key(KeyCode::Char('n'))],
        );
        let (model, _) = model.update(Msg::Paste("server = \"x:1\"".to_string()));
        let seq = model.paste.current();
        let model = feed(
            model,
            [
                Msg::Configurator(ConfiguratorMsg::PasteSettled { generation: 0, seq }),
                key(KeyCode::Enter),
            ],
        );

        assert_eq!(model.screen_name(), "new-client");
        assert!(model.status.is_some());
    }

    #[test]
    fn test_auto_connect_selects_remembered_config() {
        let prefs = prefs(|p| {
            p.auto_select_mode = AutoSelectMode::Client;
            p.auto_connect = true;
            p.auto_select_client_config = Some(PathBuf::from("/cfg/home.toml"));
        });
        let model = wizard(store(), prefs);

        let Cmd::Msg(msg) = model.init() else {
            panic!("expected auto-select message");
        };
        let (mut model, cmd) = model.update(msg);

        assert!(matches!(cmd, Cmd::Msg(Msg::Quit)));
        assert_eq!(
            model.take_outcome().unwrap().unwrap(),
            SelectedMode::Client {
                config: PathBuf::from("/cfg/home.toml")
            }
        );
    }

    #[test]
    fn test_auto_select_without_connect_stops_at_list() {
        let prefs = prefs(|p| {
            p.auto_select_mode = AutoSelectMode::Client;
            p.auto_select_client_config = Some(PathBuf::from("/cfg/office.toml"));
        });
        let model = feed(
            wizard(store(), prefs),
            [Msg::Configurator(ConfiguratorMsg::AutoSelect)],
        );

        assert_eq!(model.screen_name(), "clients");
        assert!(matches!(model.screen, Screen::Clients { selected: 1, .. }));
        assert!(!model.is_finished());
    }

    #[test]
    fn test_reconfigure_options_never_auto_select() {
        let prefs = prefs(|p| {
            p.auto_select_mode = AutoSelectMode::Client;
            p.auto_connect = true;
        });
        let options = ConfiguratorOptions::new(prefs).with_client_configs(store());
        let model = Configurator::new(options.for_reconfigure()).unwrap();

        assert!(model.init().is_none());
        let model = feed(model, [Msg::Configurator(ConfiguratorMsg::AutoSelect)]);
        assert_eq!(model.screen_name(), "mode");
    }

    #[test]
    fn test_new_client_entry_round_trip_through_store() {
        let store = Arc::new(MemoryClientConfigStore::new());
        let model = feed(
            wizard(Arc::clone(&store), prefs(|_| {})),
            [key(KeyCode::Enter), key(KeyCode::Char('n'))],
        );
        let (model, _) = model.update(Msg::Paste(OFFICE.to_string()));
        let seq = model.paste.current();
        let mut model = feed(
            model,
            [
                Msg::Configurator(ConfiguratorMsg::PasteSettled { generation: 0, seq }),
                key(KeyCode::Enter),
                key(KeyCode::Enter),
            ],
        );

        assert_eq!(
            model.take_outcome().unwrap().unwrap(),
            SelectedMode::Client {
                config: PathBuf::from("memory/office.toml")
            }
        );
    }
}
