//! In-memory log ring shared between the tracing subscriber and the
//! dashboard.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Maximum number of log lines kept in memory.
pub const MAX_LOG_ENTRIES: usize = 1000;

/// One captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Position in the feed, strictly increasing.
    pub seq: u64,
    /// Severity.
    pub level: Level,
    /// Module path that emitted the line.
    pub target: String,
    /// Rendered message and fields.
    pub message: String,
    /// When the line was captured.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct FeedInner {
    lines: VecDeque<LogLine>,
    next_seq: u64,
}

/// Cloneable handle to a bounded log ring.
#[derive(Debug, Clone, Default)]
pub struct LogFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl LogFeed {
    /// Create an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, evicting the oldest past [`MAX_LOG_ENTRIES`].
    pub fn push(&self, level: Level, target: impl Into<String>, message: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.lines.push_back(LogLine {
            seq,
            level,
            target: target.into(),
            message: message.into(),
            timestamp: Utc::now(),
        });
        while inner.lines.len() > MAX_LOG_ENTRIES {
            inner.lines.pop_front();
        }
    }

    /// Lines with `seq >= cursor`, oldest first.
    #[must_use]
    pub fn since(&self, cursor: u64) -> Vec<LogLine> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .lines
            .iter()
            .filter(|line| line.seq >= cursor)
            .cloned()
            .collect()
    }

    /// Number of lines currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lines
            .len()
    }

    /// Whether the feed holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A `tracing` layer that records every event into this feed.
    #[must_use]
    pub fn layer(&self) -> LogFeedLayer {
        LogFeedLayer { feed: self.clone() }
    }
}

/// `tracing-subscriber` layer writing into a [`LogFeed`].
pub struct LogFeedLayer {
    feed: LogFeed,
}

impl<S: Subscriber> Layer<S> for LogFeedLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        self.feed.push(*meta.level(), meta.target(), visitor.finish());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    #[test]
    fn test_since_returns_new_lines_only() {
        let feed = LogFeed::new();
        feed.push(Level::INFO, "test", "one");
        feed.push(Level::WARN, "test", "two");

        let all = feed.since(0);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].message, "one");

        let newer = feed.since(all[0].seq + 1);
        assert_eq!(newer.len(), 1);
        assert_eq!(newer[0].level, Level::WARN);
    }

    #[test]
    fn test_ring_is_bounded() {
        let feed = LogFeed::new();
        for i in 0..MAX_LOG_ENTRIES + 10 {
            feed.push(Level::DEBUG, "test", format!("line {}", i));
        }

        assert_eq!(feed.len(), MAX_LOG_ENTRIES);
        let lines = feed.since(0);
        assert_eq!(lines[0].seq, 10);
    }

    #[test]
    fn test_layer_captures_message_and_fields() {
        let feed = LogFeed::new();
        let subscriber = tracing_subscriber::registry().with(feed.layer());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(peer = "10.0.0.2", "client connected");
        });

        let lines = feed.since(0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, Level::INFO);
        assert!(lines[0].message.starts_with("client connected"));
        assert!(lines[0].message.contains("peer=10.0.0.2"));
    }
}
