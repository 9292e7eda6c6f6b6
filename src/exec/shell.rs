use super::{CommandExecutor, ExecError, ExecutionResult, InteractiveProcess, Termination};
use async_trait::async_trait;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// The system shell used to interpret command strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    program: String,
    flag: &'static str,
}

impl Shell {
    /// `cmd`/`cmd.exe` take `/C`, everything else is treated as POSIX and takes `-c`
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        // Split on both separators so Windows paths are recognised on any host
        let file_name = program
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&program)
            .to_ascii_lowercase();
        let is_cmd = file_name == "cmd" || file_name == "cmd.exe";

        Self {
            program,
            flag: if is_cmd { "/C" } else { "-c" },
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, command: &str, working_dir: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(self.flag).arg(command);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl Default for Shell {
    fn default() -> Self {
        if cfg!(windows) {
            Self::new("cmd")
        } else {
            Self::new("sh")
        }
    }
}

/// Runs command strings through a [`Shell`] using `tokio::process`
///
/// Interactive children get their own process group when stdin is not a
/// terminal, so that termination reaches everything the shell started. With a
/// terminal the child stays in the foreground group, which already receives
/// Ctrl-C, and keeps the right to read from the terminal.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: Shell,
    process_group: bool,
}

impl ShellExecutor {
    pub fn new(shell: Shell) -> Self {
        Self {
            shell,
            process_group: !io::stdin().is_terminal(),
        }
    }

    pub fn with_process_group(mut self, process_group: bool) -> Self {
        self.process_group = process_group;
        self
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(Shell::default())
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn run_captured(
        &self,
        command: &str,
        working_dir: Option<&Path>,
    ) -> Result<ExecutionResult, ExecError> {
        debug!(command, shell = self.shell.program(), "Running captured command");

        let output = self
            .shell
            .command(command, working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let result = ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: exit_code(output.status),
        };

        debug!(command, status = result.status, "Captured command finished");
        Ok(result)
    }

    async fn run_interactive(
        &self,
        command: &str,
        working_dir: Option<&Path>,
    ) -> Result<Box<dyn InteractiveProcess>, ExecError> {
        let mut cmd = self.shell.command(command, working_dir);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        #[cfg(unix)]
        if self.process_group {
            cmd.process_group(0);
        }
        let grouped = cfg!(unix) && self.process_group;

        let child = cmd
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: command.to_string(),
                source,
            })?;

        debug!(command, pid = ?child.id(), grouped, "Spawned interactive command");

        Ok(Box::new(ShellProcess {
            command: command.to_string(),
            child,
            grouped,
        }))
    }
}

/// Interactive child spawned by [`ShellExecutor`]
pub struct ShellProcess {
    command: String,
    child: Child,
    /// The child leads its own process group; signals go to the whole group
    grouped: bool,
}

impl ShellProcess {
    #[cfg(unix)]
    fn signal(&self, signal: nix::sys::signal::Signal) -> Result<(), ExecError> {
        use nix::sys::signal::{kill, killpg};
        use nix::unistd::Pid;

        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let pid = Pid::from_raw(pid as i32);

        let result = if self.grouped {
            killpg(pid, signal)
        } else {
            kill(pid, signal)
        };
        match result {
            Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(e) => Err(ExecError::Signal(e.to_string())),
        }
    }

    #[cfg(unix)]
    fn request_shutdown(&mut self) -> Result<(), ExecError> {
        self.signal(nix::sys::signal::Signal::SIGTERM)
    }

    #[cfg(not(unix))]
    fn request_shutdown(&mut self) -> Result<(), ExecError> {
        self.child.start_kill().map_err(ExecError::Wait)
    }

    async fn force_kill(&mut self) -> Result<(), ExecError> {
        #[cfg(unix)]
        if self.grouped {
            self.signal(nix::sys::signal::Signal::SIGKILL)?;
        }
        self.child.kill().await.map_err(ExecError::Wait)
    }
}

#[async_trait]
impl InteractiveProcess for ShellProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<i32, ExecError> {
        let status = self.child.wait().await.map_err(ExecError::Wait)?;
        Ok(exit_code(status))
    }

    async fn terminate(&mut self, grace_period: Duration) -> Result<Termination, ExecError> {
        if self.child.try_wait().map_err(ExecError::Wait)?.is_some() {
            return Ok(Termination::AlreadyExited);
        }

        debug!(command = %self.command, pid = ?self.child.id(), "Requesting graceful shutdown");
        self.request_shutdown()?;

        match tokio::time::timeout(grace_period, self.child.wait()).await {
            Ok(status) => {
                status.map_err(ExecError::Wait)?;
                Ok(Termination::Graceful)
            }
            Err(_) => {
                warn!(
                    command = %self.command,
                    grace_secs = grace_period.as_secs_f32(),
                    "Process did not exit within grace period, killing"
                );
                self.force_kill().await?;
                Ok(Termination::Killed)
            }
        }
    }
}

/// Exit code, or 128 + signal number for signal-terminated children on unix
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
