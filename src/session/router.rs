//! Routing of submitted input to the shell or to the responder.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::ai::BoundedResponder;
use crate::config::RouterConfig;
use crate::shell::ProcessSupervisor;

use super::output::OutputLog;

/// Put in front of every submitted input when it is echoed to the log.
pub const ECHO_PREFIX: &str = "> ";

/// Where a line of input goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Written verbatim to the shell's stdin.
    ShellCommand(String),
    /// Sent to the responder, marker stripped.
    ResponderQuery(String),
}

impl RouteDecision {
    /// Classify `raw` against the reserved `marker` token.
    ///
    /// The marker only counts as a whole token: `"/help me"` is a query,
    /// `"/helpme"` is a shell command. An empty marker routes everything to
    /// the shell.
    pub fn classify(raw: &str, marker: &str) -> Self {
        if !marker.is_empty() {
            if let Some(rest) = raw.trim().strip_prefix(marker) {
                if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                    return Self::ResponderQuery(rest.trim_start().to_string());
                }
            }
        }
        Self::ShellCommand(raw.to_string())
    }
}

/// The last submitted input, kept for the reader's degraded-mode fallback.
///
/// Single slot: every submission overwrites it.
#[derive(Clone, Debug, Default)]
pub struct PendingInput {
    slot: Arc<Mutex<Option<String>>>,
}

impl PendingInput {
    pub fn set(&self, input: &str) {
        *self.lock() = Some(input.to_string());
    }

    pub fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Classifies input and dispatches it, logging echoes and replies.
pub struct CommandRouter {
    marker: String,
    reply_tag: String,
    output: OutputLog,
    pending: PendingInput,
    responder: BoundedResponder,
}

impl CommandRouter {
    pub fn new(
        config: &RouterConfig,
        output: OutputLog,
        pending: PendingInput,
        responder: BoundedResponder,
    ) -> Self {
        Self {
            marker: config.marker.clone(),
            reply_tag: config.reply_tag.clone(),
            output,
            pending,
            responder,
        }
    }

    /// Route one line of input. Empty input is ignored and yields `None`.
    ///
    /// The echo line is appended before anything is sent anywhere. Failures
    /// end up as lines in the log, never as errors.
    pub async fn submit(&self, raw: &str, shell: &mut ProcessSupervisor) -> Option<RouteDecision> {
        if raw.is_empty() {
            return None;
        }
        self.pending.set(raw);

        let decision = RouteDecision::classify(raw, &self.marker);
        debug!("Routing input as {:?}", decision);
        self.output.append(format!("{ECHO_PREFIX}{raw}"));

        match &decision {
            RouteDecision::ShellCommand(command) => {
                if !shell.is_running() {
                    self.output.append("[shell is not running]");
                } else if let Err(e) = shell.write_input(command).await {
                    warn!("Failed to write to shell: {}", e);
                    self.output.append(format!("[failed to write to shell: {e}]"));
                }
            }
            RouteDecision::ResponderQuery(query) if query.is_empty() => {
                self.output
                    .append(format!("{}usage: {} <question>", self.reply_tag, self.marker));
            }
            RouteDecision::ResponderQuery(query) => {
                let reply = self.responder.reply_or_placeholder(query).await;
                self.output.append(format!("{}{}", self.reply_tag, reply));
            }
        }

        Some(decision)
    }
}
