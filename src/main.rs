//! Main entry point for TerminalAI.
//!
//! Loads configuration, starts the shell session, runs the TUI until the user
//! quits, and stops the shell after the terminal has been restored.

use std::sync::Arc;

use anyhow::{Context, Result};
use terminal_ai::ai::OpenAiResponder;
use terminal_ai::app::App;
use terminal_ai::config::Config;
use terminal_ai::session::Session;
use terminal_ai::utils;

#[tokio::main]
async fn main() -> Result<()> {
    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = utils::logger::init_logging();

    let config = Config::load()?;
    let responder = Arc::new(OpenAiResponder::new(&config.responder));

    let mut session = Session::new(config, responder);
    session
        .start()
        .await
        .context("Failed to start shell process")?;

    // ratatui::init installs a panic hook that restores the terminal
    let mut terminal = ratatui::init();
    let mut app = App::new(session);

    let result = async {
        app.draw(&mut terminal)?;
        app.run(&mut terminal).await
    }
    .await;

    ratatui::restore();
    app.shutdown().await;
    result
}
