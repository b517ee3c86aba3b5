//! Colors derived from the theme preference.

use ratatui::style::{Color, Modifier, Style};

use crate::prefs::Theme;

/// Resolved colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Borders of focused panels, titles, highlights.
    pub accent: Color,
    /// Secondary text, idle borders, timestamps.
    pub muted: Color,
    /// Normal text.
    pub text: Color,
    /// Healthy state.
    pub ok: Color,
    /// Warnings.
    pub warn: Color,
    /// Errors.
    pub error: Color,
    /// Footer background.
    pub bar: Color,
}

impl Palette {
    /// Palette for `theme`.
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Default => Self {
                accent: Color::Cyan,
                muted: Color::DarkGray,
                text: Color::Reset,
                ok: Color::Green,
                warn: Color::Yellow,
                error: Color::Red,
                bar: Color::DarkGray,
            },
            Theme::Dark => Self {
                accent: Color::LightCyan,
                muted: Color::Gray,
                text: Color::White,
                ok: Color::LightGreen,
                warn: Color::LightYellow,
                error: Color::LightRed,
                bar: Color::Black,
            },
            Theme::Light => Self {
                accent: Color::Blue,
                muted: Color::Gray,
                text: Color::Black,
                ok: Color::Green,
                warn: Color::Magenta,
                error: Color::Red,
                bar: Color::Gray,
            },
            Theme::HighContrast => Self {
                accent: Color::Yellow,
                muted: Color::White,
                text: Color::White,
                ok: Color::LightGreen,
                warn: Color::LightYellow,
                error: Color::LightRed,
                bar: Color::Black,
            },
        }
    }

    /// Style for a panel title.
    #[must_use]
    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Style for a highlighted list row.
    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }
}
