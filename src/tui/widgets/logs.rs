//! Log tail widget.

use crate::dashboard::LogLine;
use crate::tui::theme::Palette;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Widget},
};
use tracing::Level;

/// Widget showing the newest log lines that fit, shifted up by `scroll`.
pub struct LogTailWidget<'a> {
    /// Lines, oldest first.
    lines: &'a [LogLine],
    /// How many lines the view is scrolled back from the newest.
    scroll: usize,
    /// Whether new lines are followed automatically.
    following: bool,
    /// Colors.
    palette: Palette,
}

impl<'a> LogTailWidget<'a> {
    /// Create a new log tail widget.
    pub fn new(lines: &'a [LogLine], scroll: usize, following: bool, palette: Palette) -> Self {
        Self {
            lines,
            scroll,
            following,
            palette,
        }
    }

    /// Get the color for a log level.
    fn level_color(&self, level: Level) -> Color {
        match level {
            Level::TRACE | Level::DEBUG => self.palette.muted,
            Level::INFO => self.palette.accent,
            Level::WARN => self.palette.warn,
            Level::ERROR => self.palette.error,
        }
    }

    /// Index range of the lines visible in `height` rows.
    fn visible(&self, height: usize) -> std::ops::Range<usize> {
        let end = self.lines.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(height);
        start..end
    }
}

impl Widget for LogTailWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let range = self.visible(inner_height);

        let items: Vec<ListItem> = self.lines[range]
            .iter()
            .map(|entry| {
                let timestamp = entry.timestamp.format("%H:%M:%S");
                let line = Line::from(vec![
                    Span::styled(
                        format!("{}", timestamp),
                        Style::default().fg(self.palette.muted),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        format!("{:5}", entry.level.as_str()),
                        Style::default().fg(self.level_color(entry.level)),
                    ),
                    Span::raw(" "),
                    Span::styled(entry.message.as_str(), Style::default().fg(self.palette.text)),
                ]);
                ListItem::new(line)
            })
            .collect();

        let title = if self.following {
            format!(" Logs ({}) ", self.lines.len())
        } else {
            format!(" Logs ({}, scrolled -{}) ", self.lines.len(), self.scroll)
        };

        let block = Block::default()
            .title(Span::styled(title, self.palette.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.muted));

        List::new(items).block(block).render(area, buf);
    }
}
