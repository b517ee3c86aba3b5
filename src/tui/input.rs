//! Terminal input pump.
//!
//! Crossterm's event API is blocking, so input is read on a dedicated
//! thread and forwarded into the session mailbox. The thread polls with a
//! short timeout and exits once the mailbox is closed.

use crossterm::event;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error};

use super::msg::Msg;

/// How long a single poll may block before re-checking the mailbox.
pub const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Start forwarding terminal events into `mailbox`.
pub fn spawn_input_reader(mailbox: mpsc::UnboundedSender<Msg>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tui-input".to_string())
        .spawn(move || {
            if let Err(e) = pump(&mailbox) {
                error!("Terminal input failed: {}", e);
            }
            debug!("Input reader stopped");
        })
}

fn pump(mailbox: &mpsc::UnboundedSender<Msg>) -> io::Result<()> {
    while !mailbox.is_closed() {
        if !event::poll(INPUT_POLL_INTERVAL)? {
            continue;
        }
        let msg = Msg::from(event::read()?);
        if matches!(msg, Msg::Noop) {
            continue;
        }
        if mailbox.send(msg).is_err() {
            break;
        }
    }
    Ok(())
}
