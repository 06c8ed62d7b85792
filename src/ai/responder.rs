//! The responder seam: anything that can answer a natural-language query.
//!
//! The session never talks to a backend directly. It goes through
//! [`BoundedResponder`], which puts a timeout on every call and turns failures
//! into fixed placeholder text, so a broken or hung backend shows up as a line
//! in the output instead of stalling or crashing the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::ResponderError;

/// Shown in place of a reply when the responder failed or returned nothing.
pub const UNAVAILABLE_PLACEHOLDER: &str = "[responder unavailable]";

/// Shown in place of a reply when the responder exceeded its time budget.
pub const TIMEOUT_PLACEHOLDER: &str = "[responder timed out]";

/// Answers a natural-language query with text.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, query: &str) -> Result<String, ResponderError>;
}

/// Plain functions and closures are responders too.
///
/// They run on the blocking pool, so a closure that blocks still yields to
/// the caller's timeout.
#[async_trait]
impl<F> Responder for F
where
    F: Fn(&str) -> Result<String, ResponderError> + Clone + Send + Sync + 'static,
{
    async fn respond(&self, query: &str) -> Result<String, ResponderError> {
        let respond = self.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || respond(&query))
            .await
            .map_err(|e| ResponderError::Failed(format!("responder task failed: {e}")))?
    }
}

/// A shared responder with a bounded wait per call.
#[derive(Clone)]
pub struct BoundedResponder {
    inner: Arc<dyn Responder>,
    timeout: Duration,
}

impl BoundedResponder {
    pub fn new(inner: Arc<dyn Responder>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the responder, giving up after the configured timeout.
    ///
    /// The reply is trimmed; a reply that is empty after trimming counts as
    /// [`ResponderError::Empty`].
    pub async fn ask(&self, query: &str) -> Result<String, ResponderError> {
        match tokio::time::timeout(self.timeout, self.inner.respond(query)).await {
            Ok(Ok(reply)) => {
                let reply = reply.trim();
                if reply.is_empty() {
                    Err(ResponderError::Empty)
                } else {
                    Ok(reply.to_string())
                }
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ResponderError::TimedOut(self.timeout)),
        }
    }

    /// Like [`ask`](Self::ask), but never fails: errors become placeholders.
    pub async fn reply_or_placeholder(&self, query: &str) -> String {
        match self.ask(query).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Responder failed for query {:?}: {}", query, e);
                placeholder_for(&e).to_string()
            }
        }
    }
}

/// Map a responder failure to the text shown to the user.
pub fn placeholder_for(err: &ResponderError) -> &'static str {
    match err {
        ResponderError::TimedOut(_) => TIMEOUT_PLACEHOLDER,
        _ => UNAVAILABLE_PLACEHOLDER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowResponder(Duration);

    #[async_trait]
    impl Responder for SlowResponder {
        async fn respond(&self, _query: &str) -> Result<String, ResponderError> {
            tokio::time::sleep(self.0).await;
            Ok("too late".to_string())
        }
    }

    fn bounded<R: Responder + 'static>(responder: R) -> BoundedResponder {
        BoundedResponder::new(Arc::new(responder), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_closure_reply_is_trimmed() {
        let responder = bounded(|q: &str| -> Result<String, ResponderError> { Ok(format!("  echo {q}\n")) });
        assert_eq!(responder.ask("hi").await.unwrap(), "echo hi");
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_error() {
        let responder = bounded(|_: &str| -> Result<String, ResponderError> { Ok(" \n\t".to_string()) });
        assert!(matches!(
            responder.ask("x").await,
            Err(ResponderError::Empty)
        ));
        assert_eq!(
            responder.reply_or_placeholder("x").await,
            UNAVAILABLE_PLACEHOLDER
        );
    }

    #[tokio::test]
    async fn test_failure_becomes_placeholder() {
        let responder = bounded(|_: &str| -> Result<String, ResponderError> { Err(ResponderError::Failed("boom".into())) });
        assert_eq!(
            responder.reply_or_placeholder("x").await,
            UNAVAILABLE_PLACEHOLDER
        );
    }

    #[tokio::test]
    async fn test_slow_responder_times_out() {
        let responder = BoundedResponder::new(
            Arc::new(SlowResponder(Duration::from_secs(10))),
            Duration::from_millis(20),
        );

        let started = std::time::Instant::now();
        let err = responder.ask("x").await.unwrap_err();
        assert!(matches!(err, ResponderError::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(5));

        assert_eq!(responder.reply_or_placeholder("x").await, TIMEOUT_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_blocking_closure_times_out() {
        let responder = BoundedResponder::new(
            Arc::new(|_: &str| -> Result<String, ResponderError> {
                std::thread::sleep(Duration::from_millis(500));
                Ok("late".to_string())
            }),
            Duration::from_millis(20),
        );

        let started = std::time::Instant::now();
        let err = responder.ask("x").await.unwrap_err();
        assert!(matches!(err, ResponderError::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_panicking_closure_is_a_failure() {
        let responder = bounded(|_: &str| -> Result<String, ResponderError> { panic!("boom") });
        assert!(matches!(
            responder.ask("x").await,
            Err(ResponderError::Failed(_))
        ));
    }
}
