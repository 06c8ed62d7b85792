//! Shell subprocess lifecycle.
//!
//! The supervisor spawns the shell on a pair of plain pipes, hands the output
//! end to a [`ReaderLoop`], writes submitted lines to the shell's stdin, and
//! tears everything down again on [`stop`](ProcessSupervisor::stop).

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::ShellConfig;
use crate::error::SpawnError;

use super::reader::{ReaderHandle, ReaderLoop};
use super::transport::{InputPipe, PipeTransport};

/// A live child shell and both ends of its pipes.
///
/// The read end lives inside the reader task while it runs and is handed back
/// when the task is joined, so both ends are released together on stop.
struct ProcessHandle {
    child: Child,
    pid: Option<u32>,
    input: InputPipe,
    reader: ReaderHandle,
    alive: Arc<AtomicBool>,
}

/// Spawns, feeds and reaps the child shell.
pub struct ProcessSupervisor {
    config: ShellConfig,
    process: Option<ProcessHandle>,
}

impl ProcessSupervisor {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    /// Spawn the shell and start `reader` on its output.
    ///
    /// A previous shell that already exited on its own is reaped first.
    /// Returns the child's pid when the platform reports one.
    pub async fn start(&mut self, reader: ReaderLoop) -> Result<Option<u32>, SpawnError> {
        if self.is_running() {
            return Err(SpawnError::AlreadyRunning);
        }
        if self.process.is_some() {
            self.stop().await;
        }

        let (transport, stdio) = PipeTransport::open()?;
        let program = self.config.program.clone();

        let mut command = Command::new(&program);
        command
            .stdin(stdio.stdin)
            .stdout(stdio.stdout)
            .stderr(stdio.stderr)
            .kill_on_drop(true);
        if let Some(home) = home_dir() {
            command.current_dir(home);
        }

        let child = command.spawn().map_err(|source| SpawnError::Spawn {
            shell: program.clone(),
            source,
        })?;
        // Release our copies of the child's ends, otherwise EOF never arrives.
        drop(command);

        let pid = child.id();
        let alive = Arc::new(AtomicBool::new(true));
        let reader = reader.spawn(transport.output, alive.clone());
        info!("Spawned shell {} (pid {:?})", program, pid);

        self.process = Some(ProcessHandle {
            child,
            pid,
            input: transport.input,
            reader,
            alive,
        });
        Ok(pid)
    }

    /// Write `input` and a newline to the shell's stdin.
    ///
    /// A failure here does not end the session; if the shell has exited the
    /// reader observes EOF on its own.
    pub async fn write_input(&mut self, input: &str) -> io::Result<()> {
        let Some(process) = self.process.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "shell is not running",
            ));
        };
        process.input.write_line(input.as_bytes()).await
    }

    /// Stop the reader, close both pipes and reap the shell.
    ///
    /// Calling this again, or without a shell, does nothing.
    pub async fn stop(&mut self) {
        let Some(process) = self.process.take() else {
            debug!("Stop requested with no shell attached");
            return;
        };
        let ProcessHandle {
            mut child,
            pid,
            input,
            reader,
            ..
        } = process;

        let output = reader.stop().await;
        drop(input);
        drop(output);

        reap(&mut child, self.config.stop_grace()).await;
        info!("Shell (pid {:?}) stopped", pid);
    }

    /// Whether a shell is attached and its output is still being drained.
    pub fn is_running(&self) -> bool {
        self.process
            .as_ref()
            .is_some_and(|p| p.alive.load(Ordering::SeqCst))
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(|p| p.pid)
    }
}

fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().filter(|path| path.is_dir())
}

/// Wait for the shell to exit on stdin EOF, then escalate to SIGTERM and
/// finally SIGKILL, each step bounded by `grace`.
async fn reap(child: &mut Child, grace: Duration) {
    if exited_within(child, grace).await {
        return;
    }

    if let Some(pid) = child.id() {
        debug!("Shell {} ignored EOF, sending SIGTERM", pid);
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!("Failed to send SIGTERM to shell {}: {}", pid, e);
        }
        if exited_within(child, grace).await {
            return;
        }
    }

    warn!("Shell did not exit after SIGTERM, killing it");
    if let Err(e) = child.kill().await {
        warn!("Failed to kill shell: {}", e);
    }
}

async fn exited_within(child: &mut Child, grace: Duration) -> bool {
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            debug!("Shell exited with {}", status);
            true
        }
        Ok(Err(e)) => {
            // Nothing left to wait on.
            warn!("Failed to wait for shell: {}", e);
            true
        }
        Err(_) => false,
    }
}
