//! Error types shared by the session core.
//!
//! Only failures that prevent a session from running at all leave the
//! [`Session`](crate::session::Session) boundary as errors. Everything else is
//! absorbed and surfaced as a line in the output log.

use std::io;
use std::time::Duration;

use async_openai::error::OpenAIError;
use thiserror::Error;

/// The shell could not be brought up.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Creating one of the stdio pipes failed.
    #[error("failed to create shell pipe: {0}")]
    Pipe(#[source] io::Error),

    /// The shell binary could not be executed.
    #[error("failed to spawn shell `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },

    /// `start` was called while a shell is still attached.
    #[error("shell session is already running")]
    AlreadyRunning,
}

/// A responder call did not produce usable text.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// The chat completion backend rejected or failed the request.
    #[error("responder backend error: {0}")]
    Backend(#[from] OpenAIError),

    /// Any other responder-specific failure.
    #[error("responder failed: {0}")]
    Failed(String),

    /// The responder answered with nothing but whitespace.
    #[error("responder returned no text")]
    Empty,

    #[error("responder did not answer within {0:?}")]
    TimedOut(Duration),
}
