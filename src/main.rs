//! tunnel-console: interactive front-end for a TUN tunnel
//!
//! This is the main entry point for the tunnel-console binary. It parses the
//! CLI, sets up logging, builds the configuration stores and drives the
//! session through its phases:
//!
//! ```text
//! wait_for_mode ──► activate_runtime ──► wait_for_runtime_exit
//!      ▲                   ▲                   │
//!      │                   └── disconnected ◄──┤ (retry after a delay)
//!      └──────────────────── reconfigure ◄─────┤
//!                                quit ◄────────┘
//! ```
//!
//! # I/O Architecture
//!
//! The terminal belongs to the interface, so logs never go to stderr while
//! it runs. Every log line is captured into the in-memory feed the dashboard
//! tails, and optionally written to `--log-file`.

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};
use tunnel_console::{
    cli::Cli,
    configurator::{ConfiguratorOptions, FsClientConfigStore, FsServerConfigManager, SelectedMode},
    dashboard::{LogFeed, RuntimeOptions, TrafficCounters},
    prefs::PreferencesStore,
    session::{with_cancel, CancelHandle, Context, RuntimeExit, Session},
    SessionError,
};

/// Pause before re-activating after the link dropped.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Consecutive disconnects tolerated before giving up.
const MAX_RECONNECTS: u32 = 5;

/// A link that stayed up this long no longer counts toward a streak of
/// quick drops.
const STABLE_LINK: Duration = Duration::from_secs(30);

/// How often the link re-checks its configuration.
const LINK_CHECK_INTERVAL: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    // Parse CLI arguments first (before any other initialization)
    let cli = Cli::parse();

    let feed = LogFeed::new();
    init_tracing(cli.verbose, cli.log_file.as_deref(), &feed)?;

    debug!("Parsed CLI arguments: {:?}", cli);

    let paths = cli
        .paths()
        .context("No configuration directory available, pass --config-dir")?;
    info!("Using configuration directory {}", paths.config_dir.display());

    let prefs = Arc::new(PreferencesStore::load(paths.preferences.clone()));
    if let Some(path) = prefs.path() {
        debug!("Preferences at {}", path.display());
    }
    let clients = Arc::new(FsClientConfigStore::new(paths.clients_dir.clone()));
    debug!("Client configurations in {}", clients.dir().display());
    let mut options = ConfiguratorOptions::new(Arc::clone(&prefs)).with_client_configs(clients);
    if !cli.no_server {
        options = options.with_server_config(Arc::new(FsServerConfigManager::new(
            paths.server_config.clone(),
        )));
    }

    let runtime = Runtime::new().context("Failed to start async runtime")?;

    // SIGINT from outside the terminal; Ctrl+C typed in raw mode arrives as a key.
    let (process, context) = with_cancel();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            process.cancel();
        }
    });

    let session = Session::builder(options)
        .context(context)
        .start()
        .context("Failed to start session")?;

    let result = drive(&session, &runtime, &feed);
    session.close();
    result
}

/// Run the mode → runtime loop until the user quits.
fn drive(session: &Session, runtime: &Runtime, feed: &LogFeed) -> Result<()> {
    'configure: loop {
        let mode = match session.wait_for_mode() {
            Ok(mode) => mode,
            Err(SessionError::UserQuit) => return Ok(()),
            Err(e) => return Err(e).context("Configuration failed"),
        };
        info!("Selected {}", mode);

        let mut drops = DropStreak::default();
        loop {
            let link = Link::start(runtime, &mode);
            let started = Instant::now();
            session.activate_runtime(
                RuntimeOptions::new(mode.operating_mode(), feed.clone(), link.context())
                    .with_counters(link.counters()),
            );

            let exit = session.wait_for_runtime_exit();
            drop(link);

            match exit {
                Ok(RuntimeExit::Reconfigure) => continue 'configure,
                Err(e) if e.is_recoverable() => {
                    let disconnects = drops.record(started.elapsed());
                    if disconnects > MAX_RECONNECTS {
                        bail!("Link dropped {} times in a row, giving up", disconnects);
                    }
                    warn!(
                        "Link dropped, reconnecting in {:?} ({}/{})",
                        RECONNECT_DELAY, disconnects, MAX_RECONNECTS
                    );
                    thread::sleep(RECONNECT_DELAY);
                }
                Err(SessionError::UserQuit) => return Ok(()),
                Err(e) => return Err(e).context("Session failed"),
            }
        }
    }
}

/// Consecutive link drops, each within [`STABLE_LINK`] of coming up.
#[derive(Debug, Default)]
struct DropStreak {
    count: u32,
}

impl DropStreak {
    /// Record a drop after the link was up for `lasted`. Returns the length
    /// of the current streak.
    fn record(&mut self, lasted: Duration) -> u32 {
        if lasted >= STABLE_LINK {
            self.count = 0;
        }
        self.count += 1;
        self.count
    }
}

/// Stand-in for the tunnel data plane.
///
/// Holds the link up until it is dropped or its configuration file
/// disappears. Counters stay at zero since no packets flow.
struct Link {
    stop: CancelHandle,
    counters: Arc<TrafficCounters>,
}

impl Link {
    fn start(runtime: &Runtime, mode: &SelectedMode) -> Self {
        let (stop, context) = with_cancel();
        let counters = Arc::new(TrafficCounters::new());
        let config = mode.config_path().to_path_buf();
        let watchdog = stop.clone();

        runtime.spawn(async move {
            info!("Link up using {}", config.display());
            let mut check = tokio::time::interval(LINK_CHECK_INTERVAL);
            loop {
                tokio::select! {
                    _ = context.cancelled() => break,
                    _ = check.tick() => {
                        if let Err(e) = tokio::fs::metadata(&config).await {
                            warn!("Configuration {} unavailable: {}", config.display(), e);
                            watchdog.cancel();
                            break;
                        }
                    }
                }
            }
            info!("Link down");
        });

        Self { stop, counters }
    }

    fn context(&self) -> Context {
        self.stop.context()
    }

    fn counters(&self) -> Arc<TrafficCounters> {
        Arc::clone(&self.counters)
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

/// Initialize the tracing subscriber.
///
/// Every event goes to the dashboard's log feed; with `--log-file` it is
/// also appended to that file.
///
/// # Verbosity Levels
/// - 0 (default): `RUST_LOG`, or warnings and errors
/// - 1 (-v): Info level
/// - 2 (-vv): Debug level
/// - 3+ (-vvv): Trace level
fn init_tracing(verbose: u8, log_file: Option<&Path>, feed: &LogFeed) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(feed.layer())
        .with(file_layer)
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_drops_build_a_streak() {
        let mut drops = DropStreak::default();
        assert_eq!(drops.record(Duration::from_secs(1)), 1);
        assert_eq!(drops.record(Duration::from_secs(2)), 2);
        assert_eq!(drops.record(Duration::from_secs(3)), 3);
    }

    #[test]
    fn test_stable_link_resets_streak() {
        let mut drops = DropStreak::default();
        for _ in 0..MAX_RECONNECTS {
            drops.record(Duration::from_secs(1));
        }
        assert_eq!(drops.record(STABLE_LINK), 1);
        assert_eq!(drops.record(Duration::from_secs(1)), 2);
    }
}
