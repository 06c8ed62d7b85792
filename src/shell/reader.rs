//! Background task draining the shell's output pipe into the output log.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::unix::pipe;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::ai::BoundedResponder;
use crate::session::{OutputLog, PendingInput};

/// Optional behaviour on a hard read error: ask the responder about whatever
/// was submitted last and log its reply.
#[derive(Clone)]
pub struct DegradedFallback {
    pub responder: BoundedResponder,
    pub pending: PendingInput,
    pub reply_tag: String,
}

/// Drains the child's output until EOF, a fatal error, or a stop request.
pub struct ReaderLoop {
    output: OutputLog,
    chunk_size: usize,
    fallback: Option<DegradedFallback>,
}

impl ReaderLoop {
    pub fn new(output: OutputLog, chunk_size: usize) -> Self {
        Self {
            output,
            chunk_size: chunk_size.max(1),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: DegradedFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Start draining `pipe` on a new task.
    ///
    /// `alive` is cleared when the loop exits for any reason.
    pub fn spawn(self, pipe: pipe::Receiver, alive: Arc<AtomicBool>) -> ReaderHandle {
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(pipe, stop_rx, alive));
        ReaderHandle { stop, task }
    }

    async fn run(
        self,
        pipe: pipe::Receiver,
        mut stop: watch::Receiver<bool>,
        alive: Arc<AtomicBool>,
    ) -> pipe::Receiver {
        let mut buf = vec![0u8; self.chunk_size];

        loop {
            if *stop.borrow() {
                debug!("Reader stop requested");
                break;
            }

            let ready = tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() {
                        debug!("Reader handle dropped, stopping");
                        break;
                    }
                    continue;
                }
                ready = pipe.readable() => ready,
            };
            if let Err(e) = ready {
                alive.store(false, Ordering::SeqCst);
                self.fail(e, &mut stop).await;
                break;
            }

            match pipe.try_read(&mut buf) {
                Ok(0) => {
                    debug!("Shell output closed");
                    break;
                }
                Ok(n) => {
                    self.output
                        .append(String::from_utf8_lossy(&buf[..n]).into_owned());
                }
                // Spurious readiness; wait again.
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {}
                Err(e) => {
                    alive.store(false, Ordering::SeqCst);
                    self.fail(e, &mut stop).await;
                    break;
                }
            }
        }

        alive.store(false, Ordering::SeqCst);
        pipe
    }

    /// Report a hard read error, then run the fallback unless a stop arrives
    /// first.
    async fn fail(&self, err: io::Error, stop: &mut watch::Receiver<bool>) {
        error!("Shell output read failed: {}", err);
        self.output.append(format!("[shell output error: {err}]"));

        let Some(fallback) = &self.fallback else {
            return;
        };
        let Some(last) = fallback.pending.get() else {
            return;
        };
        if *stop.borrow() {
            return;
        }

        tokio::select! {
            biased;
            _ = stop.changed() => debug!("Stop requested, fallback reply dropped"),
            reply = fallback.responder.reply_or_placeholder(&last) => {
                self.output.append(format!("{}{}", fallback.reply_tag, reply));
            }
        }
    }
}

/// Owner side of a running [`ReaderLoop`].
pub struct ReaderHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<pipe::Receiver>,
}

impl ReaderHandle {
    /// Ask the loop to stop, wait for it, and take back the read end.
    pub async fn stop(self) -> Option<pipe::Receiver> {
        if self.stop.send(true).is_err() {
            debug!("Reader already exited");
        }
        match self.task.await {
            Ok(pipe) => Some(pipe),
            Err(e) => {
                warn!("Reader task did not finish cleanly: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Responder;
    use crate::error::ResponderError;
    use async_trait::async_trait;
    use std::io::Write;
    use std::os::fd::OwnedFd;
    use std::time::Duration;

    fn pipe_pair() -> (pipe::Receiver, io::PipeWriter) {
        let (reader, writer) = io::pipe().unwrap();
        let receiver = pipe::Receiver::from_owned_fd(OwnedFd::from(reader)).unwrap();
        (receiver, writer)
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_drains_chunks_until_eof() {
        let (receiver, mut writer) = pipe_pair();
        let output = OutputLog::new();
        let alive = Arc::new(AtomicBool::new(true));

        let handle = ReaderLoop::new(output.clone(), 256).spawn(receiver, alive.clone());

        writer.write_all(b"hello\n").unwrap();
        wait_until(|| output.snapshot().concat().contains("hello")).await;
        assert!(alive.load(Ordering::SeqCst));

        drop(writer);
        wait_until(|| !alive.load(Ordering::SeqCst)).await;

        assert!(handle.stop().await.is_some());
        assert_eq!(output.snapshot().concat(), "hello\n");
    }

    #[tokio::test]
    async fn test_small_chunks_split_output() {
        let (receiver, mut writer) = pipe_pair();
        let output = OutputLog::new();
        let alive = Arc::new(AtomicBool::new(true));

        let handle = ReaderLoop::new(output.clone(), 4).spawn(receiver, alive.clone());
        writer.write_all(b"abcdefghij").unwrap();
        drop(writer);
        wait_until(|| !alive.load(Ordering::SeqCst)).await;
        handle.stop().await;

        let entries = output.snapshot();
        assert!(entries.iter().all(|e| e.len() <= 4));
        assert_eq!(entries.concat(), "abcdefghij");
    }

    #[tokio::test]
    async fn test_stop_without_eof() {
        let (receiver, _writer) = pipe_pair();
        let alive = Arc::new(AtomicBool::new(true));
        let handle = ReaderLoop::new(OutputLog::new(), 256).spawn(receiver, alive.clone());

        let returned = tokio::time::timeout(Duration::from_secs(1), handle.stop())
            .await
            .unwrap();
        assert!(returned.is_some());
        assert!(!alive.load(Ordering::SeqCst));
    }

    fn fallback(pending: &PendingInput, responder: Arc<dyn Responder>) -> DegradedFallback {
        DegradedFallback {
            responder: BoundedResponder::new(responder, Duration::from_secs(5)),
            pending: pending.clone(),
            reply_tag: "AI: ".to_string(),
        }
    }

    fn fixed(reply: &'static str) -> Arc<dyn Responder> {
        Arc::new(move |_: &str| -> Result<String, ResponderError> { Ok(reply.to_string()) })
    }

    struct Hanging;

    #[async_trait]
    impl Responder for Hanging {
        async fn respond(&self, _query: &str) -> Result<String, ResponderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("never".to_string())
        }
    }

    #[tokio::test]
    async fn test_read_error_asks_about_pending_input() {
        let output = OutputLog::new();
        let pending = PendingInput::default();
        pending.set("ls -z");
        let reader = ReaderLoop::new(output.clone(), 256)
            .with_fallback(fallback(&pending, fixed("try ls -a")));
        let (_stop, mut stop_rx) = watch::channel(false);

        reader.fail(io::Error::other("gone"), &mut stop_rx).await;

        assert_eq!(
            output.snapshot(),
            vec!["[shell output error: gone]", "AI: try ls -a"]
        );
    }

    #[tokio::test]
    async fn test_read_error_without_pending_input() {
        let output = OutputLog::new();
        let reader = ReaderLoop::new(output.clone(), 256)
            .with_fallback(fallback(&PendingInput::default(), fixed("unused")));
        let (_stop, mut stop_rx) = watch::channel(false);

        reader.fail(io::Error::other("gone"), &mut stop_rx).await;

        assert_eq!(output.snapshot(), vec!["[shell output error: gone]"]);
    }

    #[tokio::test]
    async fn test_read_error_without_fallback() {
        let output = OutputLog::new();
        let reader = ReaderLoop::new(output.clone(), 256);
        let (_stop, mut stop_rx) = watch::channel(false);

        reader.fail(io::Error::other("gone"), &mut stop_rx).await;

        assert_eq!(output.snapshot(), vec!["[shell output error: gone]"]);
    }

    #[tokio::test]
    async fn test_stop_interrupts_fallback() {
        let output = OutputLog::new();
        let pending = PendingInput::default();
        pending.set("ls");
        let reader = ReaderLoop::new(output.clone(), 256)
            .with_fallback(fallback(&pending, Arc::new(Hanging)));
        let (stop, mut stop_rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stop.send(true).unwrap();
        });

        tokio::time::timeout(
            Duration::from_secs(2),
            reader.fail(io::Error::other("gone"), &mut stop_rx),
        )
        .await
        .unwrap();

        assert_eq!(output.snapshot(), vec!["[shell output error: gone]"]);
    }
}
