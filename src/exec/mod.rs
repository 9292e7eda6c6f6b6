//! Shell command execution
//!
//! Two ways to run a command string through the system shell:
//!
//! - [`CommandExecutor::run_captured`] blocks until the command finishes and returns
//!   its output. A non-zero exit status is a normal [`ExecutionResult`], not an error.
//! - [`CommandExecutor::run_interactive`] attaches the child to the caller's terminal
//!   and hands back an [`InteractiveProcess`] that can be awaited or terminated.
//!
//! [`ExecError`] only covers failures of the executor itself (spawn or wait failed).

pub mod recording;
mod shell;

pub use recording::{RecordedCommand, RecordingExecutor, ScriptedChild};
pub use shell::{Shell, ShellExecutor, ShellProcess};

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the executor itself
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for child process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Failed to signal child process: {0}")]
    Signal(String),
}

/// Output of a completed captured command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// How an interactive child ended up stopping after `terminate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Child had already exited before termination was requested
    AlreadyExited,
    /// Child exited within the grace period
    Graceful,
    /// Child outlived the grace period and was killed
    Killed,
}

/// A running child attached to the caller's terminal
#[async_trait]
pub trait InteractiveProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Waits for the child to exit and returns its exit status
    async fn wait(&mut self) -> Result<i32, ExecError>;

    /// Requests graceful shutdown, then force-kills once `grace_period` elapses
    async fn terminate(&mut self, grace_period: Duration) -> Result<Termination, ExecError>;
}

#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run_captured(
        &self,
        command: &str,
        working_dir: Option<&Path>,
    ) -> Result<ExecutionResult, ExecError>;

    async fn run_interactive(
        &self,
        command: &str,
        working_dir: Option<&Path>,
    ) -> Result<Box<dyn InteractiveProcess>, ExecError>;
}
