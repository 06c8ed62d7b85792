//! Plain pipes between the session and the child shell.
//!
//! Two anonymous pipes are created: one feeds the child's stdin, the other
//! collects both its stdout and stderr. No pseudo-terminal is involved, so the
//! shell sees ordinary non-tty files.

use std::io;
use std::os::fd::OwnedFd;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::net::unix::pipe;

use crate::error::SpawnError;

/// Parent-side ends of the two pipes.
pub struct PipeTransport {
    pub input: InputPipe,
    /// Non-blocking read end, registered with the runtime for readiness.
    pub output: pipe::Receiver,
}

/// Child-side ends, handed to the spawn call and dropped right after it.
pub struct ChildStdio {
    pub stdin: Stdio,
    pub stdout: Stdio,
    pub stderr: Stdio,
}

impl PipeTransport {
    /// Create both pipes.
    ///
    /// Must be called from within a Tokio runtime, since the parent ends are
    /// registered with its reactor.
    pub fn open() -> Result<(Self, ChildStdio), SpawnError> {
        let (stdin_reader, stdin_writer) = io::pipe().map_err(SpawnError::Pipe)?;
        let (output_reader, output_writer) = io::pipe().map_err(SpawnError::Pipe)?;
        let stderr_writer = output_writer.try_clone().map_err(SpawnError::Pipe)?;

        let input = pipe::Sender::from_owned_fd(OwnedFd::from(stdin_writer))
            .map_err(SpawnError::Pipe)?;
        let output = pipe::Receiver::from_owned_fd(OwnedFd::from(output_reader))
            .map_err(SpawnError::Pipe)?;

        Ok((
            Self {
                input: InputPipe { sender: input },
                output,
            },
            ChildStdio {
                stdin: Stdio::from(stdin_reader),
                stdout: Stdio::from(output_writer),
                stderr: Stdio::from(stderr_writer),
            },
        ))
    }
}

/// Write end of the child's stdin.
pub struct InputPipe {
    sender: pipe::Sender,
}

impl InputPipe {
    /// Write `bytes` followed by a newline and flush.
    pub async fn write_line(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sender.write_all(bytes).await?;
        self.sender.write_all(b"\n").await?;
        self.sender.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_without_reader_fails() {
        let (mut transport, child) = PipeTransport::open().unwrap();
        drop(child);

        let err = transport.input.write_line(b"echo hi").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_output_reports_eof_once_child_ends_close() {
        let (transport, child) = PipeTransport::open().unwrap();
        drop(child);

        transport.output.readable().await.unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(transport.output.try_read(&mut buf).unwrap(), 0);
    }
}
