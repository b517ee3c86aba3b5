//! Terminal setup and teardown.
//!
//! The session draws either to the real terminal (raw mode, alternate
//! screen, bracketed paste) or to an in-memory buffer for headless use.
//! Whatever happens to the loop, the real terminal is put back the way we
//! found it: on drop, on panic (via a hook), and through
//! [`restore_terminal`] as a last resort.

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{CrosstermBackend, TestBackend},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;
use tracing::{error, info};

static PANIC_HOOK: Once = Once::new();

/// Put the terminal back into cooked mode on the main screen.
///
/// Safe to call when the terminal was never set up.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    Ok(())
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));
    });
}

/// Owns the real terminal while the session is running.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(e);
        }

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        info!("Terminal initialized");

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Leave raw mode and the alternate screen. Idempotent.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;

        info!("Terminal restored");
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Where the session renders.
pub enum Surface {
    /// The process terminal.
    Terminal(TerminalGuard),
    /// An in-memory buffer of fixed size.
    Headless(Terminal<TestBackend>),
}

impl Surface {
    /// Take over the process terminal.
    pub fn terminal() -> io::Result<Self> {
        TerminalGuard::new().map(Surface::Terminal)
    }

    /// Render into a `columns` x `rows` buffer.
    pub fn headless(columns: u16, rows: u16) -> io::Result<Self> {
        Terminal::new(TestBackend::new(columns, rows)).map(Surface::Headless)
    }

    /// Whether this surface owns the process terminal.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self, Surface::Terminal(_))
    }

    /// Current size as `(columns, rows)`.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        let size = match self {
            Surface::Terminal(guard) => guard.terminal.size()?,
            Surface::Headless(terminal) => terminal.size()?,
        };
        Ok((size.width, size.height))
    }

    /// Draw one frame.
    pub fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        match self {
            Surface::Terminal(guard) => guard.terminal.draw(render).map(|_| ()),
            Surface::Headless(terminal) => terminal.draw(render).map(|_| ()),
        }
    }

    /// Adapt the headless buffer to a new size. No-op for the real terminal,
    /// which ratatui resizes on its own.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        if let Surface::Headless(terminal) = self {
            terminal.backend_mut().resize(columns, rows);
        }
    }

    /// Text of the last headless frame, one line per row.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        let Surface::Headless(terminal) = self else {
            return None;
        };
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let lines: Vec<String> = buffer
            .content()
            .chunks(width.max(1))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect();
        Some(lines.join("\n"))
    }
}
