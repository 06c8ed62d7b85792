//! Event handling for the terminal frontend.
//!
//! User input is read on a dedicated thread and forwarded over a channel, so
//! the main loop can `select!` between keystrokes and its redraw tick without
//! ever blocking on the terminal.
//!
//! # Submodules
//!
//! - `keys`: maps key presses to frontend actions

pub mod keys;

use std::io::Result;
use std::thread;

use tokio::sync::mpsc::{self, Receiver};

pub use keys::{Action, map_key};

/// Type alias for user input events from the terminal.
pub type UserEvent = crossterm::event::Event;

/// Initializes the user event stream.
///
/// Spawns a thread that blocks on `crossterm::event::read()` and forwards every
/// event. The thread ends when the receiver is dropped.
pub fn init_user_event() -> Receiver<Result<UserEvent>> {
    let (tx, rx) = mpsc::channel(64);
    thread::spawn(move || {
        loop {
            if tx.blocking_send(crossterm::event::read()).is_err() {
                break;
            }
        }
    });
    rx
}
