//! The shell session: one child shell, its output log, and the input router.
//!
//! [`Session`] is what a frontend talks to. It only needs four calls:
//! `start` once, `submit` for every line the user enters, `snapshot` whenever
//! it redraws, and `stop` on the way out.
//!
//! ```no_run
//! use std::sync::Arc;
//! use terminal_ai::config::Config;
//! use terminal_ai::error::ResponderError;
//! use terminal_ai::session::Session;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let responder = Arc::new(|q: &str| -> Result<String, ResponderError> {
//!     Ok(format!("echo {q}"))
//! });
//! let mut session = Session::new(Config::default(), responder);
//! session.start().await?;
//!
//! session.submit("ls").await;
//! session.submit("/help how do I list hidden files").await;
//! for entry in session.snapshot() {
//!     print!("{entry}");
//! }
//!
//! session.stop().await;
//! # Ok(())
//! # }
//! ```

mod output;
mod router;

use std::sync::Arc;

use tracing::info;

use crate::ai::{BoundedResponder, Responder};
use crate::config::Config;
use crate::error::SpawnError;
use crate::shell::{DegradedFallback, ProcessSupervisor, ReaderLoop};

pub use output::OutputLog;
pub use router::{CommandRouter, ECHO_PREFIX, PendingInput, RouteDecision};

/// A shell subprocess plus the routing and buffering around it.
pub struct Session {
    config: Config,
    supervisor: ProcessSupervisor,
    router: CommandRouter,
    output: OutputLog,
    pending: PendingInput,
    responder: BoundedResponder,
}

impl Session {
    /// Create an idle session. Nothing is spawned until [`start`](Self::start).
    pub fn new(config: Config, responder: Arc<dyn Responder>) -> Self {
        let output = OutputLog::new();
        let pending = PendingInput::default();
        let responder = BoundedResponder::new(responder, config.router.responder_timeout());
        let router = CommandRouter::new(
            &config.router,
            output.clone(),
            pending.clone(),
            responder.clone(),
        );

        Self {
            supervisor: ProcessSupervisor::new(config.shell.clone()),
            config,
            router,
            output,
            pending,
            responder,
        }
    }

    /// Spawn the shell and start capturing its output.
    ///
    /// On error nothing is left running and the session stays stopped.
    pub async fn start(&mut self) -> Result<(), SpawnError> {
        let mut reader = ReaderLoop::new(self.output.clone(), self.config.shell.read_chunk_size);
        if self.config.router.degraded_fallback {
            reader = reader.with_fallback(DegradedFallback {
                responder: self.responder.clone(),
                pending: self.pending.clone(),
                reply_tag: self.config.router.reply_tag.clone(),
            });
        }

        let pid = self.supervisor.start(reader).await?;
        info!("Session started (shell pid {:?})", pid);
        Ok(())
    }

    /// Route one line of user input to the shell or the responder.
    ///
    /// On the responder path this waits for the reply, bounded by the
    /// configured responder timeout.
    pub async fn submit(&mut self, text: &str) -> Option<RouteDecision> {
        self.router.submit(text, &mut self.supervisor).await
    }

    /// Copy of everything captured so far, in arrival order.
    pub fn snapshot(&self) -> Vec<String> {
        self.output.snapshot()
    }

    pub fn clear(&self) {
        self.output.clear();
    }

    /// Stop the shell and drop the captured output. Safe to call repeatedly.
    pub async fn stop(&mut self) {
        self.supervisor.stop().await;
        self.output.clear();
        self.pending.clear();
    }

    /// False before `start`, after `stop`, and once the shell has exited.
    pub fn is_running(&self) -> bool {
        self.supervisor.is_running()
    }

    pub fn pid(&self) -> Option<u32> {
        self.supervisor.pid()
    }

    /// Another handle to the output log, for readers on other tasks.
    pub fn output(&self) -> OutputLog {
        self.output.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
