//! Keybinding footer.

use crate::tui::theme::Palette;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget for the one-line keybinding bar.
pub struct FooterWidget<'a> {
    /// `(key, action)` pairs in display order.
    bindings: &'a [(&'a str, &'a str)],
    /// Optional status message shown after the bindings.
    message: Option<&'a str>,
    /// Colors.
    palette: Palette,
}

impl<'a> FooterWidget<'a> {
    /// Create a new footer.
    pub fn new(bindings: &'a [(&'a str, &'a str)], palette: Palette) -> Self {
        Self {
            bindings,
            message: None,
            palette,
        }
    }

    /// Set a status message.
    pub fn with_message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for FooterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_style = Style::default()
            .fg(Color::Black)
            .bg(self.palette.accent)
            .add_modifier(Modifier::BOLD);
        let action_style = Style::default().fg(Color::White);
        let sep_style = Style::default().fg(self.palette.muted);

        let mut spans = Vec::with_capacity(self.bindings.len() * 2 + 2);
        for (key, action) in self.bindings {
            spans.push(Span::styled(format!(" {} ", key), key_style));
            spans.push(Span::styled(format!("{} ", action), action_style));
        }

        if let Some(msg) = self.message {
            spans.push(Span::styled("|", sep_style));
            spans.push(Span::styled(
                format!(" {} ", msg),
                Style::default().fg(self.palette.ok),
            ));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.palette.bar))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::Theme;

    #[test]
    fn test_footer_renders_bindings_and_message() {
        let bindings = [("q", "Quit"), ("r", "Reconfigure")];
        let widget = FooterWidget::new(&bindings, Palette::for_theme(Theme::Default))
            .with_message(Some("saved"));

        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let row: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(row.contains(" q Quit"));
        assert!(row.contains("Reconfigure"));
        assert!(row.contains("saved"));
    }
}
