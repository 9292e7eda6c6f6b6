//! Scripted executor that records invocations instead of spawning processes
//!
//! Used by tests that need to observe what would have been run (clone commands,
//! the chosen candidate) without touching the network or the terminal.

use super::{CommandExecutor, ExecError, ExecutionResult, InteractiveProcess, Termination};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub command: String,
    pub working_dir: Option<PathBuf>,
}

/// How scripted interactive children behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedChild {
    /// `wait` resolves immediately with this status
    Exits(i32),
    /// `wait` never resolves; `terminate` stops it gracefully
    Hangs,
    /// `wait` never resolves; `terminate` has to kill it
    IgnoresTerminate,
}

type CapturedHook = Box<dyn Fn(&str, Option<&Path>) + Send + Sync>;

pub struct RecordingExecutor {
    captured: Mutex<Vec<RecordedCommand>>,
    interactive: Mutex<Vec<RecordedCommand>>,
    terminations: Arc<Mutex<Vec<Duration>>>,
    captured_result: ExecutionResult,
    child: ScriptedChild,
    on_captured: Option<CapturedHook>,
}

impl RecordingExecutor {
    /// Captured commands succeed with empty output; children exit with 0
    pub fn new() -> Self {
        Self {
            captured: Mutex::new(Vec::new()),
            interactive: Mutex::new(Vec::new()),
            terminations: Arc::new(Mutex::new(Vec::new())),
            captured_result: ExecutionResult {
                stdout: String::new(),
                stderr: String::new(),
                status: 0,
            },
            child: ScriptedChild::Exits(0),
            on_captured: None,
        }
    }

    pub fn with_captured_result(mut self, result: ExecutionResult) -> Self {
        self.captured_result = result;
        self
    }

    pub fn with_child(mut self, child: ScriptedChild) -> Self {
        self.child = child;
        self
    }

    /// Runs `hook` for every captured command, e.g. to create the clone directory
    pub fn on_captured(
        mut self,
        hook: impl Fn(&str, Option<&Path>) + Send + Sync + 'static,
    ) -> Self {
        self.on_captured = Some(Box::new(hook));
        self
    }

    pub fn captured_commands(&self) -> Vec<RecordedCommand> {
        lock(&self.captured).clone()
    }

    pub fn interactive_commands(&self) -> Vec<RecordedCommand> {
        lock(&self.interactive).clone()
    }

    /// Grace periods passed to `terminate`, in call order
    pub fn terminations(&self) -> Vec<Duration> {
        lock(&self.terminations).clone()
    }
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn record(command: &str, working_dir: Option<&Path>) -> RecordedCommand {
    RecordedCommand {
        command: command.to_string(),
        working_dir: working_dir.map(Path::to_path_buf),
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run_captured(
        &self,
        command: &str,
        working_dir: Option<&Path>,
    ) -> Result<ExecutionResult, ExecError> {
        lock(&self.captured).push(record(command, working_dir));
        if let Some(hook) = &self.on_captured {
            hook(command, working_dir);
        }
        Ok(self.captured_result.clone())
    }

    async fn run_interactive(
        &self,
        command: &str,
        working_dir: Option<&Path>,
    ) -> Result<Box<dyn InteractiveProcess>, ExecError> {
        lock(&self.interactive).push(record(command, working_dir));
        Ok(Box::new(ScriptedProcess {
            behavior: self.child,
            exited: false,
            terminations: Arc::clone(&self.terminations),
        }))
    }
}

struct ScriptedProcess {
    behavior: ScriptedChild,
    exited: bool,
    terminations: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl InteractiveProcess for ScriptedProcess {
    fn id(&self) -> Option<u32> {
        None
    }

    async fn wait(&mut self) -> Result<i32, ExecError> {
        match self.behavior {
            ScriptedChild::Exits(code) => {
                self.exited = true;
                Ok(code)
            }
            ScriptedChild::Hangs | ScriptedChild::IgnoresTerminate => {
                std::future::pending::<Result<i32, ExecError>>().await
            }
        }
    }

    async fn terminate(&mut self, grace_period: Duration) -> Result<Termination, ExecError> {
        lock(&self.terminations).push(grace_period);
        if self.exited {
            return Ok(Termination::AlreadyExited);
        }
        self.exited = true;
        Ok(match self.behavior {
            ScriptedChild::IgnoresTerminate => Termination::Killed,
            _ => Termination::Graceful,
        })
    }
}
