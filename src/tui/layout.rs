//! Screen layouts.
//!
//! Dashboard:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Header: mode, uptime, link state        │
//! ├─────────────────────────────────────────┤
//! │ Data plane: totals and rates  (toggle)  │
//! ├─────────────────────────────────────────┤
//! │                                         │
//! │ Logs                          (toggle)  │
//! │                                         │
//! ├─────────────────────────────────────────┤
//! │ Footer: keybindings           (toggle)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The wizard uses a title block, a body, and the same footer.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the runtime dashboard.
#[derive(Debug, Clone)]
pub struct DashboardLayout {
    /// Header block.
    pub header: Rect,
    /// Data-plane statistics, when shown.
    pub stats: Option<Rect>,
    /// Log tail, when shown.
    pub logs: Option<Rect>,
    /// Keybinding footer, when shown.
    pub footer: Option<Rect>,
}

impl DashboardLayout {
    /// Compute the dashboard layout for `area`.
    pub fn compute(area: Rect, show_stats: bool, show_logs: bool, show_footer: bool) -> Self {
        let mut constraints = vec![Constraint::Length(3)];
        if show_stats {
            constraints.push(Constraint::Length(4));
        }
        // The log panel soaks up the remaining height; without it a filler
        // keeps the footer pinned to the bottom.
        constraints.push(Constraint::Min(if show_logs { 3 } else { 0 }));
        if show_footer {
            constraints.push(Constraint::Length(1));
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut next = chunks.iter().copied();
        let header = next.next().unwrap_or_default();
        let stats = if show_stats { next.next() } else { None };
        let middle = next.next();
        let logs = if show_logs { middle } else { None };
        let footer = if show_footer { next.next() } else { None };

        Self {
            header,
            stats,
            logs,
            footer,
        }
    }
}

/// Areas of a wizard screen.
#[derive(Debug, Clone)]
pub struct WizardLayout {
    /// Title block.
    pub title: Rect,
    /// Screen body.
    pub body: Rect,
    /// Keybinding footer, when shown.
    pub footer: Option<Rect>,
}

impl WizardLayout {
    /// Compute the wizard layout for `area`.
    pub fn compute(area: Rect, show_footer: bool) -> Self {
        let footer_height = u16::from(show_footer);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(footer_height),
            ])
            .split(area);

        Self {
            title: chunks[0],
            body: chunks[1],
            footer: show_footer.then_some(chunks[2]),
        }
    }
}
