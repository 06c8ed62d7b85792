//! TerminalAI - an embedded shell with a natural-language side channel
//!
//! This library provides the core functionality for TerminalAI, including:
//! - Shell subprocess management over plain pipes
//! - Background capture of shell output into a shared log
//! - Routing of user input to the shell or to an AI responder
//! - A terminal frontend that renders the captured output
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use terminal_ai::ai::OpenAiResponder;
//! use terminal_ai::config::Config;
//! use terminal_ai::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let responder = Arc::new(OpenAiResponder::new(&config.responder));
//!
//!     let mut session = Session::new(config, responder);
//!     session.start().await?;
//!
//!     // Goes to bash
//!     session.submit("echo hi").await;
//!     // Goes to the responder, reply is logged as "AI: ..."
//!     session.submit("/help show disk usage").await;
//!
//!     println!("{:?}", session.snapshot());
//!     session.stop().await;
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod session;
pub mod shell;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use ai::{OpenAiResponder, Responder};
pub use app::App;
pub use config::Config;
pub use error::{ResponderError, SpawnError};
pub use session::{OutputLog, RouteDecision, Session};
