//! Dashboard sub-model.

use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};
use tracing::{debug, info};

use super::{
    DashboardMsg, LogFeed, LogLine, RuntimeOptions, RuntimeRequest, TrafficCounters,
    TrafficSnapshot, LOG_POLL_INTERVAL, MAX_LOG_ENTRIES, STATS_POLL_INTERVAL,
};
use crate::configurator::OperatingMode;
use crate::prefs::{Preferences, PreferencesStore, StatsUnits};
use crate::sequence::SequenceGuard;
use crate::session::Context;
use crate::tui::{is_interrupt, Cmd, Msg, SubModel};

/// Runtime dashboard sub-model.
pub struct Dashboard {
    pub(super) mode: OperatingMode,
    feed: LogFeed,
    counters: Option<Arc<TrafficCounters>>,
    context: Context,
    epoch: u64,
    store: Arc<PreferencesStore>,
    pub(super) prefs: Arc<Preferences>,

    pub(super) lines: Vec<LogLine>,
    cursor: u64,
    pub(super) scroll: usize,
    pub(super) following: bool,
    log_poll: SequenceGuard,

    stats_poll: SequenceGuard,
    last_sample: Option<(Instant, TrafficSnapshot)>,
    pub(super) totals: TrafficSnapshot,
    pub(super) rates: (u64, u64),

    pub(super) started: Instant,
    pub(super) size: (u16, u16),
    pub(super) status: Option<String>,
    request: Option<RuntimeRequest>,
}

impl Dashboard {
    /// Build the dashboard for activation number `epoch`.
    pub fn new(options: RuntimeOptions, store: Arc<PreferencesStore>, epoch: u64) -> Self {
        let prefs = store.preferences();
        Self {
            mode: options.mode,
            feed: options.logs,
            counters: options.counters,
            context: options.context,
            epoch,
            store,
            prefs,
            lines: Vec::new(),
            cursor: 0,
            scroll: 0,
            following: true,
            log_poll: SequenceGuard::new(),
            stats_poll: SequenceGuard::new(),
            last_sample: None,
            totals: TrafficSnapshot::default(),
            rates: (0, 0),
            started: Instant::now(),
            size: (0, 0),
            status: None,
            request: None,
        }
    }

    /// Activation number this dashboard belongs to.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// What the user asked for, once the dashboard has finished.
    #[must_use]
    pub fn request(&self) -> Option<RuntimeRequest> {
        self.request
    }

    /// Whether the live connection context has ended.
    #[must_use]
    pub fn link_down(&self) -> bool {
        self.context.is_cancelled()
    }

    /// Whether traffic counters are attached.
    #[must_use]
    pub fn has_counters(&self) -> bool {
        self.counters.is_some()
    }

    fn finish(&mut self, request: RuntimeRequest) -> Cmd {
        info!("Dashboard finished: {:?}", request);
        self.log_poll.advance();
        self.stats_poll.advance();
        self.request = Some(request);
        Cmd::quit()
    }

    /// Rows available to the log panel, borders excluded.
    fn page(&self) -> usize {
        usize::from(self.size.1.saturating_sub(10)).max(1)
    }

    fn watch_link(&self) -> Cmd {
        let context = self.context.clone();
        let epoch = self.epoch;
        Cmd::task(async move {
            context.cancelled().await;
            Msg::RuntimeDone { epoch }
        })
    }

    fn schedule_log_poll(&self, seq: u64) -> Cmd {
        Cmd::after(
            LOG_POLL_INTERVAL,
            Msg::Dashboard(DashboardMsg::LogTick {
                epoch: self.epoch,
                seq,
            }),
        )
    }

    fn schedule_stats_poll(&self, seq: u64) -> Cmd {
        Cmd::after(
            STATS_POLL_INTERVAL,
            Msg::Dashboard(DashboardMsg::StatsTick {
                epoch: self.epoch,
                seq,
            }),
        )
    }

    /// Pull new lines into the tail. Returns how many arrived.
    fn pull_logs(&mut self) -> usize {
        let fresh = self.feed.since(self.cursor);
        let Some(last) = fresh.last() else {
            return 0;
        };
        self.cursor = last.seq + 1;

        let count = fresh.len();
        self.lines.extend(fresh);
        if self.lines.len() > MAX_LOG_ENTRIES {
            let excess = self.lines.len() - MAX_LOG_ENTRIES;
            self.lines.drain(..excess);
        }

        if !self.following {
            // Keep the viewport on the same lines.
            self.scroll = (self.scroll + count).min(self.max_scroll());
        }
        count
    }

    fn sample_stats(&mut self) {
        let Some(counters) = &self.counters else {
            return;
        };
        let now = Instant::now();
        let snapshot = counters.snapshot();
        if let Some((at, earlier)) = &self.last_sample {
            self.rates = snapshot.rates_since(earlier, now.duration_since(*at));
        }
        self.totals = snapshot;
        self.last_sample = Some((now, snapshot));
    }

    fn on_log_tick(&mut self, seq: u64) -> Cmd {
        if !self.log_poll.is_current(seq) {
            debug!("Dropping stale log tick {}", seq);
            return Cmd::none();
        }
        self.pull_logs();
        self.schedule_log_poll(seq)
    }

    fn on_stats_tick(&mut self, seq: u64) -> Cmd {
        if !self.stats_poll.is_current(seq) {
            debug!("Dropping stale stats tick {}", seq);
            return Cmd::none();
        }
        self.sample_stats();
        self.schedule_stats_poll(seq)
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.page())
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_add(n).min(self.max_scroll());
        self.following = self.scroll == 0;
    }

    fn scroll_down(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_sub(n);
        self.following = self.scroll == 0;
    }

    fn toggle_logs(&mut self) -> Cmd {
        let seq = self.log_poll.advance();
        self.prefs = self
            .store
            .update(|p| p.show_dataplane_logs = !p.show_dataplane_logs);
        if self.prefs.show_dataplane_logs {
            self.pull_logs();
            self.schedule_log_poll(seq)
        } else {
            Cmd::none()
        }
    }

    fn toggle_stats(&mut self) -> Cmd {
        let seq = self.stats_poll.advance();
        self.prefs = self
            .store
            .update(|p| p.show_dataplane_stats = !p.show_dataplane_stats);
        if self.prefs.show_dataplane_stats && self.counters.is_some() {
            self.last_sample = None;
            self.sample_stats();
            self.schedule_stats_poll(seq)
        } else {
            Cmd::none()
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Cmd {
        if is_interrupt(&key) {
            return self.finish(RuntimeRequest::Exit);
        }

        match key.code {
            KeyCode::Char('q') => self.finish(RuntimeRequest::Exit),
            KeyCode::Char('r') => self.finish(RuntimeRequest::Reconfigure),
            KeyCode::Char('l') => self.toggle_logs(),
            KeyCode::Char('s') => self.toggle_stats(),
            KeyCode::Char('f') => {
                self.prefs = self.store.update(|p| p.show_footer = !p.show_footer);
                Cmd::none()
            }
            KeyCode::Char('u') => {
                self.prefs = self.store.update(|p| p.stats_units = p.stats_units.toggled());
                let units = match self.prefs.stats_units {
                    StatsUnits::Bytes => "bytes",
                    StatsUnits::Bits => "bits",
                };
                self.status = Some(format!("Units: {}", units));
                Cmd::none()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_up(1);
                Cmd::none()
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_down(1);
                Cmd::none()
            }
            KeyCode::PageUp => {
                self.scroll_up(self.page());
                Cmd::none()
            }
            KeyCode::PageDown => {
                self.scroll_down(self.page());
                Cmd::none()
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.scroll_up(usize::MAX / 2);
                Cmd::none()
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.scroll_down(usize::MAX);
                Cmd::none()
            }
            _ => Cmd::none(),
        }
    }
}

impl SubModel for Dashboard {
    fn init(&self) -> Cmd {
        let logs = if self.prefs.show_dataplane_logs {
            Cmd::msg(Msg::Dashboard(DashboardMsg::LogTick {
                epoch: self.epoch,
                seq: self.log_poll.current(),
            }))
        } else {
            Cmd::none()
        };
        let stats = if self.prefs.show_dataplane_stats && self.counters.is_some() {
            Cmd::msg(Msg::Dashboard(DashboardMsg::StatsTick {
                epoch: self.epoch,
                seq: self.stats_poll.current(),
            }))
        } else {
            Cmd::none()
        };
        Cmd::batch([self.watch_link(), logs, stats])
    }

    fn update(mut self, msg: Msg) -> (Self, Cmd) {
        if self.request.is_some() {
            return (self, Cmd::none());
        }

        self.prefs = self.store.preferences();
        let cmd = match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Resize(columns, rows) => {
                self.size = (columns, rows);
                self.scroll = self.scroll.min(self.max_scroll());
                Cmd::none()
            }
            Msg::Dashboard(tick) if tick.epoch() != self.epoch => {
                debug!("Dropping tick of activation {}", tick.epoch());
                Cmd::none()
            }
            Msg::Dashboard(DashboardMsg::LogTick { seq, .. }) => self.on_log_tick(seq),
            Msg::Dashboard(DashboardMsg::StatsTick { seq, .. }) => self.on_stats_tick(seq),
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
    use crate::session::with_cancel;
    use std::time::Duration;
    use tokio::time::timeout;
    use tracing::Level;

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::from(code))
    }

    fn dashboard(feed: &LogFeed) -> (Dashboard, Arc<PreferencesStore>) {
        let store = Arc::new(PreferencesStore::in_memory(Preferences::default()));
        let options = RuntimeOptions::new(OperatingMode::Client, feed.clone(), Context::background());
        let mut model = Dashboard::new(options, Arc::clone(&store), 1);
        model.size = (80, 24);
        (model, store)
    }

    fn tick(model: Dashboard) -> (Dashboard, Cmd) {
        let seq = model.log_poll.current();
        model.update(Msg::Dashboard(DashboardMsg::LogTick { epoch: 1, seq }))
    }

    #[test]
    fn test_exit_and_reconfigure_requests() {
        let feed = LogFeed::new();
        let (model, _) = dashboard(&feed);
        let (model, cmd) = model.update(key(KeyCode::Char('r')));
        assert!(matches!(cmd, Cmd::Msg(Msg::Quit)));
        assert_eq!(model.request(), Some(RuntimeRequest::Reconfigure));

        // Finished dashboards ignore further input.
        let (model, cmd) = model.update(key(KeyCode::Char('q')));
        assert!(cmd.is_none());
        assert_eq!(model.request(), Some(RuntimeRequest::Reconfigure));

        let (model, _) = dashboard(&feed);
        let (model, _) = model.update(key(KeyCode::Char('q')));
        assert_eq!(model.request(), Some(RuntimeRequest::Exit));
    }

    #[test]
    fn test_log_tick_pulls_and_reschedules() {
        let feed = LogFeed::new();
        feed.push(Level::INFO, "tunnel", "handshake complete");
        feed.push(Level::WARN, "tunnel", "rekey slow");
        let (model, _) = dashboard(&feed);

        let (model, cmd) = tick(model);
        assert_eq!(model.lines.len(), 2);
        assert!(matches!(cmd, Cmd::Task(_)));

        feed.push(Level::INFO, "tunnel", "third");
        let (model, _) = tick(model);
        assert_eq!(model.lines.len(), 3);
        assert_eq!(model.lines[2].message, "third");
    }

    #[test]
    fn test_ticks_from_another_activation_are_dropped() {
        let feed = LogFeed::new();
        feed.push(Level::INFO, "tunnel", "up");
        let (model, _) = dashboard(&feed);

        // Same round number, earlier activation.
        let seq = model.log_poll.current();
        let (model, cmd) = model.update(Msg::Dashboard(DashboardMsg::LogTick { epoch: 0, seq }));
        assert!(cmd.is_none());
        assert!(model.lines.is_empty());
    }

    #[test]
    fn test_hiding_logs_abandons_poll_chain() {
        let feed = LogFeed::new();
        let (model, store) = dashboard(&feed);
        let stale = model.log_poll.current();

        let (model, cmd) = model.update(key(KeyCode::Char('l')));
        assert!(cmd.is_none());
        assert!(!store.preferences().show_dataplane_logs);

        feed.push(Level::INFO, "tunnel", "ignored while hidden");
        let (model, cmd) = model.update(Msg::Dashboard(DashboardMsg::LogTick {
            epoch: 1,
            seq: stale,
        }));
        assert!(cmd.is_none());
        assert!(model.lines.is_empty());

        // Showing again starts a fresh chain and catches up.
        let (model, cmd) = model.update(key(KeyCode::Char('l')));
        assert!(matches!(cmd, Cmd::Task(_)));
        assert_eq!(model.lines.len(), 1);
    }

    #[test]
    fn test_scrolling_anchors_viewport() {
        let feed = LogFeed::new();
        for i in 0..40 {
            feed.push(Level::INFO, "tunnel", format!("line {}", i));
        }
        let (model, _) = dashboard(&feed);
        let (model, _) = tick(model);

        let (model, _) = model.update(key(KeyCode::Char('k')));
        assert_eq!(model.scroll, 1);
        assert!(!model.following);

        feed.push(Level::INFO, "tunnel", "new");
        let (model, _) = tick(model);
        assert_eq!(model.scroll, 2);

        let (model, _) = model.update(key(KeyCode::Char('G')));
        assert_eq!(model.scroll, 0);
        assert!(model.following);

        let (model, _) = model.update(key(KeyCode::Char('g')));
        assert_eq!(model.scroll, model.max_scroll());
    }

    #[test]
    fn test_toggles_persist_through_store() {
        let feed = LogFeed::new();
        let (model, store) = dashboard(&feed);
        let (model, _) = model.update(key(KeyCode::Char('u')));
        let (_model, _) = model.update(key(KeyCode::Char('f')));

        let prefs = store.preferences();
        assert_eq!(prefs.stats_units, StatsUnits::Bits);
        assert!(!prefs.show_footer);
    }

    #[test]
    fn test_stats_sampling() {
        let feed = LogFeed::new();
        let store = Arc::new(PreferencesStore::in_memory(Preferences::default()));
        let counters = Arc::new(TrafficCounters::new());
        counters.record_rx(1500);
        let options = RuntimeOptions::new(OperatingMode::Server, feed, Context::background())
            .with_counters(Arc::clone(&counters));
        let model = Dashboard::new(options, store, 1);
        assert_eq!(model.init().count(), 3);

        let seq = model.stats_poll.current();
        let (model, cmd) = model.update(Msg::Dashboard(DashboardMsg::StatsTick { epoch: 1, seq }));
        assert!(matches!(cmd, Cmd::Task(_)));
        assert_eq!(model.totals.rx_bytes, 1500);
        assert_eq!(model.totals.rx_packets, 1);
    }

    #[tokio::test]
    async fn test_link_watcher_reports_epoch() {
        let (handle, ctx) = with_cancel();
        let store = Arc::new(PreferencesStore::in_memory(Preferences::default()));
        let options = RuntimeOptions::new(OperatingMode::Client, LogFeed::new(), ctx);
        let model = Dashboard::new(options, store, 7);

        let Cmd::Batch(cmds) = model.init() else {
            panic!("expected batched init");
        };
        let Some(Cmd::Task(watcher)) = cmds.into_iter().next() else {
            panic!("expected link watcher first");
        };

        handle.cancel();
        let msg = timeout(Duration::from_secs(1), watcher).await.unwrap();
        assert!(matches!(msg, Msg::RuntimeDone { epoch: 7 }));
        assert!(model.link_down());
    }
}
