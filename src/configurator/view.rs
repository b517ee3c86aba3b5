//! Wizard rendering.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::wizard::{Configurator, Screen};
use super::OperatingMode;
use crate::tui::{FooterWidget, Palette, WizardLayout};

const MODE_KEYS: &[(&str, &str)] = &[("↑↓", "Move"), ("Enter", "Choose"), ("q", "Quit")];
const CLIENT_KEYS: &[(&str, &str)] = &[
    ("Enter", "Connect"),
    ("n", "New"),
    ("d", "Delete"),
    ("Esc", "Back"),
];
const NEW_CLIENT_KEYS: &[(&str, &str)] = &[("Enter", "Save"), ("Esc", "Cancel")];

impl Configurator {
    pub(super) fn render(&self, frame: &mut Frame, area: Rect) {
        let palette = Palette::for_theme(self.prefs.theme);
        let layout = WizardLayout::compute(area, self.prefs.show_footer);

        let (title, bindings) = match &self.screen {
            Screen::Mode { .. } => ("Select mode", MODE_KEYS),
            Screen::Clients { .. } => ("Client configurations", CLIENT_KEYS),
            Screen::NewClient { .. } => ("New client configuration", NEW_CLIENT_KEYS),
        };

        let header = Paragraph::new(Line::from(Span::styled(title, palette.title())))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent)),
            );
        frame.render_widget(header, layout.title);

        match &self.screen {
            Screen::Mode { selected } => self.render_modes(frame, layout.body, *selected, palette),
            Screen::Clients {
                entries, selected, ..
            } => {
                let items: Vec<ListItem> = entries
                    .iter()
                    .map(|e| {
                        ListItem::new(Line::from(vec![
                            Span::styled(e.name.as_str(), Style::default().fg(palette.text)),
                            Span::raw("  "),
                            Span::styled(
                                e.path.display().to_string(),
                                Style::default().fg(palette.muted),
                            ),
                        ]))
                    })
                    .collect();

                let block = panel(" Stored ", palette);
                if items.is_empty() {
                    let empty = Paragraph::new("No client configurations. Press n to add one.")
                        .style(Style::default().fg(palette.muted))
                        .block(block);
                    frame.render_widget(empty, layout.body);
                } else {
                    let list = List::new(items)
                        .block(block)
                        .highlight_style(palette.selected())
                        .highlight_symbol("> ");
                    let mut state = ListState::default().with_selected(Some(*selected));
                    frame.render_stateful_widget(list, layout.body, &mut state);
                }
            }
            Screen::NewClient { input, settling } => {
                let title = if *settling { " Paste (settling) " } else { " Paste or type " };
                let text = Paragraph::new(input.as_str())
                    .style(Style::default().fg(palette.text))
                    .wrap(Wrap { trim: false })
                    .block(panel(title, palette));
                frame.render_widget(text, layout.body);
            }
        }

        if let Some(footer) = layout.footer {
            let widget =
                FooterWidget::new(bindings, palette).with_message(self.status.as_deref());
            frame.render_widget(widget, footer);
        }
    }

    fn render_modes(&self, frame: &mut Frame, area: Rect, selected: usize, palette: Palette) {
        let items: Vec<ListItem> = self
            .modes()
            .into_iter()
            .map(|mode| {
                let label = match mode {
                    OperatingMode::Client => "Client  connect to a tunnel server",
                    OperatingMode::Server => "Server  accept tunnel clients",
                };
                ListItem::new(label)
            })
            .collect();

        let list = List::new(items)
            .block(panel(" Mode ", palette))
            .highlight_style(palette.selected())
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn panel(title: &str, palette: Palette) -> Block<'_> {
    Block::default()
        .title(Span::styled(title, palette.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted))
}
