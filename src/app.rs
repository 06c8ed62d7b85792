//! Frontend state and main loop.
//!
//! The App owns the [`Session`] together with the input line and scroll
//! position. It redraws on every key press and on a short tick, so output
//! captured by the reader task shows up without user interaction.

use std::cell::Cell;
use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::Receiver;
use tracing::debug;

use crate::event::{Action, UserEvent, init_user_event, map_key};
use crate::session::Session;

/// How often the output pane is refreshed while idle.
const REDRAW_INTERVAL: Duration = Duration::from_millis(50);

/// Lines moved per PageUp/PageDown.
const SCROLL_STEP: usize = 10;

pub struct App {
    session: Session,

    // UI state, read by the ui module when rendering
    pub(crate) input: String,
    pub(crate) scroll_back: usize, // lines above the tail
    pub(crate) max_scroll: Cell<usize>, // updated on every render

    exit: bool,
    user_events: Receiver<io::Result<UserEvent>>,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self::with_events(session, init_user_event())
    }

    /// Build an App fed from an arbitrary event source.
    pub fn with_events(session: Session, user_events: Receiver<io::Result<UserEvent>>) -> Self {
        Self {
            session,
            input: String::new(),
            scroll_back: 0,
            max_scroll: Cell::new(0),
            exit: false,
            user_events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut tick = tokio::time::interval(REDRAW_INTERVAL);
        loop {
            if self.exit {
                break Ok(());
            }
            tokio::select! {
                res = self.user_events.recv() => {
                    let usr_evt = res.context("User event stream is ended.")?;
                    self.handle_user_event(usr_evt?).await;
                }
                _ = tick.tick() => {}
            }
            self.draw(terminal)?;
        }
    }

    pub fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(&*self, area);
            frame.set_cursor_position(crate::ui::cursor_position(&*self, area));
        })?;
        Ok(())
    }

    async fn handle_user_event(&mut self, event: UserEvent) {
        if let UserEvent::Key(key) = event {
            if let Some(action) = map_key(key) {
                self.handle_action(action).await;
            }
        }
    }

    /// Apply one frontend action.
    pub async fn handle_action(&mut self, action: Action) {
        match action {
            Action::Insert(c) => self.input.push(c),
            Action::Backspace => {
                self.input.pop();
            }
            Action::Submit => {
                let line = std::mem::take(&mut self.input);
                self.scroll_back = 0;
                self.session.submit(&line).await;
            }
            Action::ClearOutput => {
                self.session.clear();
                self.scroll_back = 0;
            }
            Action::ScrollUp => {
                self.scroll_back = (self.scroll_back + SCROLL_STEP).min(self.max_scroll.get());
            }
            Action::ScrollDown => {
                self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP);
            }
            Action::FollowTail => self.scroll_back = 0,
            Action::Quit => {
                debug!("Quit requested");
                self.exit = true;
            }
        }
    }

    /// Stop the session. Call after the terminal has been restored.
    pub async fn shutdown(&mut self) {
        self.session.stop().await;
    }
}
