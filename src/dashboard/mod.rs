//! Live connection dashboard shown while the session is in runtime.
//!
//! - `logfeed` - bounded log ring filled by a `tracing` layer
//! - `stats` - data-plane traffic counters and unit formatting
//! - `model` - the dashboard sub-model
//! - `view` - rendering

mod logfeed;
mod model;
mod stats;
mod view;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use logfeed::{LogFeed, LogFeedLayer, LogLine, MAX_LOG_ENTRIES};
pub use model::Dashboard;
pub use stats::{format_amount, format_rate, TrafficCounters, TrafficSnapshot};

use crate::configurator::OperatingMode;
use crate::session::Context;

/// How often the log tail is refreshed.
pub const LOG_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How often traffic rates are sampled.
pub const STATS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything a dashboard needs, handed over on activation.
#[derive(Clone)]
pub struct RuntimeOptions {
    /// Which side of the tunnel is running.
    pub mode: OperatingMode,
    /// Log lines to tail.
    pub logs: LogFeed,
    /// Data-plane counters, when the data plane exposes them.
    pub counters: Option<Arc<TrafficCounters>>,
    /// Cancelled when the live connection ends.
    pub context: Context,
}

impl RuntimeOptions {
    /// Options without traffic counters.
    #[must_use]
    pub fn new(mode: OperatingMode, logs: LogFeed, context: Context) -> Self {
        Self {
            mode,
            logs,
            counters: None,
            context,
        }
    }

    /// Attach traffic counters.
    #[must_use]
    pub fn with_counters(mut self, counters: Arc<TrafficCounters>) -> Self {
        self.counters = Some(counters);
        self
    }
}

impl fmt::Debug for RuntimeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeOptions")
            .field("mode", &self.mode)
            .field("logs", &self.logs.len())
            .field("counters", &self.counters.is_some())
            .field("cancelled", &self.context.is_cancelled())
            .finish()
    }
}

/// Dashboard-internal messages.
///
/// Every tick carries the activation it was scheduled by, so a tick that
/// outlives its dashboard is never applied by the next one.
#[derive(Debug)]
pub enum DashboardMsg {
    /// Time to pull new lines from the log feed.
    LogTick {
        /// Activation that scheduled the tick.
        epoch: u64,
        /// Poll round the tick belongs to.
        seq: u64,
    },
    /// Time to sample the traffic counters.
    StatsTick {
        /// Activation that scheduled the tick.
        epoch: u64,
        /// Sample round the tick belongs to.
        seq: u64,
    },
}

impl DashboardMsg {
    /// Activation the message belongs to.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        match self {
            DashboardMsg::LogTick { epoch, .. } | DashboardMsg::StatsTick { epoch, .. } => *epoch,
        }
    }
}

/// What the dashboard asked the session to do when it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeRequest {
    /// Leave the application.
    Exit,
    /// Go back to the configurator.
    Reconfigure,
}
