//! Shell subprocess management.
//!
//! This module spawns the shell on plain pipes, drains its output in the
//! background, and writes submitted commands to its stdin.

mod reader;
mod supervisor;
mod transport;

pub use reader::{DegradedFallback, ReaderHandle, ReaderLoop};
pub use supervisor::ProcessSupervisor;
pub use transport::{ChildStdio, InputPipe, PipeTransport};
