//! Data-plane traffic counters and their display.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::prefs::StatsUnits;

/// Counters updated by the tunnel data plane.
#[derive(Debug, Default)]
pub struct TrafficCounters {
    rx_bytes: AtomicU64,
    tx_bytes: AtomicU64,
    rx_packets: AtomicU64,
    tx_packets: AtomicU64,
}

impl TrafficCounters {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a packet received from the tunnel.
    pub fn record_rx(&self, bytes: usize) {
        self.rx_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.rx_packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a packet sent into the tunnel.
    pub fn record_tx(&self, bytes: usize) {
        self.tx_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.tx_packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    #[must_use]
    pub fn snapshot(&self) -> TrafficSnapshot {
        TrafficSnapshot {
            rx_bytes: self.rx_bytes.load(Ordering::Relaxed),
            tx_bytes: self.tx_bytes.load(Ordering::Relaxed),
            rx_packets: self.rx_packets.load(Ordering::Relaxed),
            tx_packets: self.tx_packets.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`TrafficCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficSnapshot {
    /// Bytes received.
    pub rx_bytes: u64,
    /// Bytes sent.
    pub tx_bytes: u64,
    /// Packets received.
    pub rx_packets: u64,
    /// Packets sent.
    pub tx_packets: u64,
}

impl TrafficSnapshot {
    /// Per-second rates between `earlier` and `self` over `elapsed`.
    #[must_use]
    pub fn rates_since(&self, earlier: &TrafficSnapshot, elapsed: Duration) -> (u64, u64) {
        let secs = elapsed.as_secs_f64();
        if secs <= f64::EPSILON {
            return (0, 0);
        }
        let rx = self.rx_bytes.saturating_sub(earlier.rx_bytes) as f64 / secs;
        let tx = self.tx_bytes.saturating_sub(earlier.tx_bytes) as f64 / secs;
        (rx.round() as u64, tx.round() as u64)
    }
}

/// Format a byte total in the preferred units.
#[must_use]
pub fn format_amount(bytes: u64, units: StatsUnits) -> String {
    match units {
        StatsUnits::Bytes => scale(bytes as f64, 1024.0, &["B", "KiB", "MiB", "GiB", "TiB"]),
        StatsUnits::Bits => scale(
            bytes as f64 * 8.0,
            1000.0,
            &["bit", "kbit", "Mbit", "Gbit", "Tbit"],
        ),
    }
}

/// Format a bytes-per-second rate in the preferred units.
#[must_use]
pub fn format_rate(bytes_per_sec: u64, units: StatsUnits) -> String {
    format!("{}/s", format_amount(bytes_per_sec, units))
}

fn scale(mut value: f64, step: f64, suffixes: &[&str]) -> String {
    let mut idx = 0;
    while value >= step && idx + 1 < suffixes.len() {
        value /= step;
        idx += 1;
    }
    if idx == 0 {
        format!("{} {}", value as u64, suffixes[0])
    } else {
        format!("{:.1} {}", value, suffixes[idx])
    }
}
