//! Dashboard rendering.

use std::time::Duration;

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::model::Dashboard;
use super::{format_amount, format_rate};
use crate::tui::{DashboardLayout, FooterWidget, LogTailWidget, Palette};

const KEYS: &[(&str, &str)] = &[
    ("q", "Quit"),
    ("r", "Reconfigure"),
    ("s", "Stats"),
    ("l", "Logs"),
    ("u", "Units"),
    ("f", "Footer"),
];

fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

impl Dashboard {
    pub(super) fn render(&self, frame: &mut Frame, area: Rect) {
        let palette = Palette::for_theme(self.prefs.theme);
        let layout = DashboardLayout::compute(
            area,
            self.prefs.show_dataplane_stats,
            self.prefs.show_dataplane_logs,
            self.prefs.show_footer,
        );

        let (state, state_color) = if self.link_down() {
            ("link down", palette.error)
        } else {
            ("connected", palette.ok)
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} ", self.mode), palette.title()),
            Span::styled("| ", Style::default().fg(palette.muted)),
            Span::styled(state, Style::default().fg(state_color)),
            Span::styled(" | up ", Style::default().fg(palette.muted)),
            Span::styled(
                format_uptime(self.started.elapsed()),
                Style::default().fg(palette.text),
            ),
        ]))
        .block(
            Block::default()
                .title(Span::styled(" Tunnel ", palette.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent)),
        );
        frame.render_widget(header, layout.header);

        if let Some(stats) = layout.stats {
            self.render_stats(frame, stats, palette);
        }

        if let Some(logs) = layout.logs {
            let widget = LogTailWidget::new(&self.lines, self.scroll, self.following, palette);
            frame.render_widget(widget, logs);
        }

        if let Some(footer) = layout.footer {
            let widget = FooterWidget::new(KEYS, palette).with_message(self.status.as_deref());
            frame.render_widget(widget, footer);
        }
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect, palette: Palette) {
        let block = Block::default()
            .title(Span::styled(" Data plane ", palette.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.muted));

        if !self.has_counters() {
            let empty = Paragraph::new("No traffic counters for this connection")
                .style(Style::default().fg(palette.muted))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let units = self.prefs.stats_units;
        let label = Style::default().fg(palette.muted);
        let value = Style::default().fg(palette.text);
        let row = |name: &'static str, total: u64, packets: u64, rate: u64| {
            Line::from(vec![
                Span::styled(name, label),
                Span::styled(format!("{:>12}", format_amount(total, units)), value),
                Span::styled(format!("{:>10} pkts", packets), label),
                Span::styled(format!("{:>16}", format_rate(rate, units)), value),
            ])
        };

        let text = vec![
            row(" rx ", self.totals.rx_bytes, self.totals.rx_packets, self.rates.0),
            row(" tx ", self.totals.tx_bytes, self.totals.tx_packets, self.rates.1),
        ];
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}
