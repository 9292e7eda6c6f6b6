//! Candidate selection and launch
//!
//! Lists the candidates, settles on one (automatically when there is a single
//! candidate, otherwise by asking on the console) and runs it attached to the
//! terminal inside the checkout. A cancellation future stands in for Ctrl-C so
//! interruption can be driven from tests.

use crate::exec::{CommandExecutor, ExecError, Termination};
use crate::resolve::RunCandidate;
use serde::Serialize;
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

const SEPARATOR_WIDTH: usize = 50;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Console I/O failed: {0}")]
    Console(#[from] io::Error),

    #[error("Failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: ExecError,
    },

    #[error("Lost track of `{command}`: {source}")]
    Process {
        command: String,
        #[source]
        source: ExecError,
    },
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nothing to run; an advisory was printed
    Unresolved,
    /// The command ran to completion
    Exited { command: String, status: i32 },
    /// The cancellation signal fired and the command was stopped
    Interrupted {
        command: String,
        termination: TerminationKind,
    },
}

/// Serializable mirror of [`Termination`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationKind {
    AlreadyExited,
    Graceful,
    Killed,
}

impl From<Termination> for TerminationKind {
    fn from(termination: Termination) -> Self {
        match termination {
            Termination::AlreadyExited => TerminationKind::AlreadyExited,
            Termination::Graceful => TerminationKind::Graceful,
            Termination::Killed => TerminationKind::Killed,
        }
    }
}

/// Maps a console answer to a zero-based index
///
/// Anything that is not a number between 1 and `count` selects the first candidate.
pub fn select_candidate(count: usize, answer: &str) -> usize {
    match answer.trim().parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => choice - 1,
        _ => {
            debug!(answer = answer.trim(), count, "Selection out of range, using first candidate");
            0
        }
    }
}

/// Writes the numbered candidate list
pub fn write_candidates<W: Write>(output: &mut W, candidates: &[RunCandidate]) -> io::Result<()> {
    writeln!(output, "Found the following run commands:")?;
    for (i, candidate) in candidates.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, candidate.command)?;
    }
    Ok(())
}

enum ChildEvent {
    Exited(Result<i32, ExecError>),
    Cancelled,
}

pub struct RunOrchestrator {
    executor: Arc<dyn CommandExecutor>,
    grace_period: Duration,
    auto_select: bool,
}

impl RunOrchestrator {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            grace_period: DEFAULT_GRACE_PERIOD,
            auto_select: false,
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Skip the prompt and take the first candidate
    pub fn with_auto_select(mut self, auto_select: bool) -> Self {
        self.auto_select = auto_select;
        self
    }

    fn choose<R: BufRead, W: Write>(
        &self,
        candidates: &[RunCandidate],
        input: &mut R,
        output: &mut W,
    ) -> io::Result<usize> {
        if candidates.len() == 1 || self.auto_select {
            return Ok(0);
        }

        write!(output, "Choose a command to run (enter the number): ")?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        Ok(select_candidate(candidates.len(), &answer))
    }

    /// Selects and runs one candidate inside `repo_path`
    ///
    /// Returns once the command exits, or once `cancel` resolves and the command
    /// has been stopped. Interruption is reported as [`RunOutcome::Interrupted`],
    /// not as an error.
    pub async fn run<R, W, F>(
        &self,
        candidates: &[RunCandidate],
        repo_path: &Path,
        input: &mut R,
        output: &mut W,
        cancel: F,
    ) -> Result<RunOutcome, OrchestratorError>
    where
        R: BufRead,
        W: Write,
        F: Future<Output = ()>,
    {
        if candidates.is_empty() {
            writeln!(output, "Could not determine how to run the application.")?;
            writeln!(output, "Please examine the repository and run manually.")?;
            info!("No run command could be determined");
            return Ok(RunOutcome::Unresolved);
        }

        write_candidates(output, candidates)?;
        let index = self.choose(candidates, input, output)?;
        let command = candidates[index].command.clone();

        writeln!(output, "\nRunning: {}", command)?;
        writeln!(output, "{}", "=".repeat(SEPARATOR_WIDTH))?;
        output.flush()?;

        info!(command = %command, cwd = %repo_path.display(), "Launching run command");

        let mut child = self
            .executor
            .run_interactive(&command, Some(repo_path))
            .await
            .map_err(|source| OrchestratorError::Launch {
                command: command.clone(),
                source,
            })?;

        tokio::pin!(cancel);
        let event = tokio::select! {
            status = child.wait() => ChildEvent::Exited(status),
            _ = &mut cancel => ChildEvent::Cancelled,
        };

        match event {
            ChildEvent::Exited(status) => {
                let status = status.map_err(|source| OrchestratorError::Process {
                    command: command.clone(),
                    source,
                })?;
                info!(command = %command, status, "Run command exited");
                Ok(RunOutcome::Exited { command, status })
            }
            ChildEvent::Cancelled => {
                writeln!(output, "\nProcess interrupted. Shutting down...")?;
                output.flush()?;

                let termination = child
                    .terminate(self.grace_period)
                    .await
                    .map_err(|source| OrchestratorError::Process {
                        command: command.clone(),
                        source,
                    })?;

                if termination == Termination::Killed {
                    warn!(command = %command, "Run command had to be killed");
                } else {
                    info!(command = %command, ?termination, "Run command stopped");
                }

                Ok(RunOutcome::Interrupted {
                    command,
                    termination: termination.into(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{RecordingExecutor, ScriptedChild};
    use crate::resolve::CandidateSource;
    use std::io::Cursor;
    use yare::parameterized;

    fn candidates(commands: &[&str]) -> Vec<RunCandidate> {
        commands
            .iter()
            .map(|c| {
                RunCandidate::new(
                    *c,
                    CandidateSource::Workflow {
                        file: "ci.yml".to_string(),
                    },
                )
            })
            .collect()
    }

    fn never() -> impl Future<Output = ()> {
        std::future::pending()
    }

    #[parameterized(
        first = { "1", 0 },
        last = { "3\n", 2 },
        padded = { "  2  \n", 1 },
        zero = { "0", 0 },
        too_large = { "4", 0 },
        negative = { "-1", 0 },
        not_a_number = { "abc", 0 },
        empty = { "", 0 },
    )]
    fn test_select_candidate(answer: &str, expected: usize) {
        assert_eq!(select_candidate(3, answer), expected);
    }

    #[tokio::test]
    async fn test_no_candidates_prints_advisory() {
        let executor = Arc::new(RecordingExecutor::new());
        let orchestrator = RunOrchestrator::new(executor.clone());
        let mut output = Vec::new();

        let outcome = orchestrator
            .run(&[], Path::new("/repo"), &mut Cursor::new(""), &mut output, never())
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Unresolved);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Could not determine how to run the application."));
        assert!(executor.interactive_commands().is_empty());
    }

    #[tokio::test]
    async fn test_single_candidate_runs_without_prompt() {
        let executor = Arc::new(RecordingExecutor::new().with_child(ScriptedChild::Exits(0)));
        let orchestrator = RunOrchestrator::new(executor.clone());
        let mut output = Vec::new();

        let outcome = orchestrator
            .run(
                &candidates(&["python app.py"]),
                Path::new("/repo"),
                &mut Cursor::new(""),
                &mut output,
                never(),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Exited {
                command: "python app.py".to_string(),
                status: 0
            }
        );

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("1. python app.py"));
        assert!(!text.contains("Choose a command"));
        assert!(text.contains("Running: python app.py"));

        let launched = executor.interactive_commands();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].working_dir.as_deref(), Some(Path::new("/repo")));
    }

    #[tokio::test]
    async fn test_multiple_candidates_prompt_for_choice() {
        let executor = Arc::new(RecordingExecutor::new());
        let orchestrator = RunOrchestrator::new(executor.clone());
        let mut output = Vec::new();

        orchestrator
            .run(
                &candidates(&["npm run dev", "npm start"]),
                Path::new("/repo"),
                &mut Cursor::new("2\n"),
                &mut output,
                never(),
            )
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("1. npm run dev\n2. npm start\n"));
        assert!(text.contains("Choose a command to run (enter the number): "));
        assert_eq!(executor.interactive_commands()[0].command, "npm start");
    }

    #[tokio::test]
    async fn test_invalid_choice_defaults_to_first() {
        let executor = Arc::new(RecordingExecutor::new());
        let orchestrator = RunOrchestrator::new(executor.clone());

        orchestrator
            .run(
                &candidates(&["npm run dev", "npm start"]),
                Path::new("/repo"),
                &mut Cursor::new("seven\n"),
                &mut Vec::new(),
                never(),
            )
            .await
            .unwrap();

        assert_eq!(executor.interactive_commands()[0].command, "npm run dev");
    }

    #[tokio::test]
    async fn test_auto_select_skips_prompt() {
        let executor = Arc::new(RecordingExecutor::new());
        let orchestrator = RunOrchestrator::new(executor.clone()).with_auto_select(true);
        let mut output = Vec::new();

        orchestrator
            .run(
                &candidates(&["make run", "make serve"]),
                Path::new("/repo"),
                &mut Cursor::new("2\n"),
                &mut output,
                never(),
            )
            .await
            .unwrap();

        assert!(!String::from_utf8(output).unwrap().contains("Choose a command"));
        assert_eq!(executor.interactive_commands()[0].command, "make run");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_failed() {
        let executor = Arc::new(RecordingExecutor::new().with_child(ScriptedChild::Exits(1)));
        let orchestrator = RunOrchestrator::new(executor);

        let outcome = orchestrator
            .run(
                &candidates(&["npm start"]),
                Path::new("/repo"),
                &mut Cursor::new(""),
                &mut Vec::new(),
                never(),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Exited { status: 1, .. }));
    }

    #[tokio::test]
    async fn test_cancellation_terminates_with_grace_period() {
        let executor = Arc::new(RecordingExecutor::new().with_child(ScriptedChild::Hangs));
        let orchestrator = RunOrchestrator::new(executor.clone())
            .with_grace_period(Duration::from_secs(3));
        let mut output = Vec::new();

        let outcome = orchestrator
            .run(
                &candidates(&["npm start"]),
                Path::new("/repo"),
                &mut Cursor::new(""),
                &mut output,
                async {},
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Interrupted {
                command: "npm start".to_string(),
                termination: TerminationKind::Graceful,
            }
        );
        assert_eq!(executor.terminations(), vec![Duration::from_secs(3)]);
        assert!(String::from_utf8(output)
            .unwrap()
            .contains("Process interrupted. Shutting down..."));
    }

    #[tokio::test]
    async fn test_cancellation_force_kill_is_not_an_error() {
        let executor =
            Arc::new(RecordingExecutor::new().with_child(ScriptedChild::IgnoresTerminate));
        let orchestrator = RunOrchestrator::new(executor);

        let outcome = orchestrator
            .run(
                &candidates(&["docker-compose up"]),
                Path::new("/repo"),
                &mut Cursor::new(""),
                &mut Vec::new(),
                async {},
            )
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Interrupted {
                termination: TerminationKind::Killed,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancellation_of_real_process() {
        use crate::exec::ShellExecutor;

        let orchestrator = RunOrchestrator::new(Arc::new(ShellExecutor::default()))
            .with_grace_period(Duration::from_secs(2));
        let temp = tempfile::TempDir::new().unwrap();

        let outcome = orchestrator
            .run(
                &candidates(&["sleep 30"]),
                temp.path(),
                &mut Cursor::new(""),
                &mut Vec::new(),
                tokio::time::sleep(Duration::from_millis(100)),
            )
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Interrupted {
                termination: TerminationKind::Graceful,
                ..
            }
        ));
    }
}
