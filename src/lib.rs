//! clonerun - clone a repository and work out how to run it
//!
//! Given a remote repository URL, clonerun makes a local copy, inspects the
//! project's CI workflows and build files, derives a list of plausible run
//! commands and launches the one the user picks. The launched command is stopped
//! gracefully on Ctrl-C and killed if it does not exit within a grace period.
//!
//! # Core Concepts
//!
//! - **Acquisition**: cloning the remote, or reusing a directory that already exists
//! - **Detection**: one listing of the checkout and its workflow directory, reduced to
//!   presence flags for well-known build files
//! - **Resolution**: workflow `run:` commands that look like start commands, or else a
//!   single command derived from the highest-precedence build file
//! - **Orchestration**: listing candidates, reading a choice, running it attached to
//!   the terminal
//!
//! # Example Usage
//!
//! ```no_run
//! use clonerun::{analyze, RealFileSystem};
//! use std::path::Path;
//!
//! let analysis = analyze(&RealFileSystem::new(), Path::new("./widget"))?;
//! for command in analysis.commands() {
//!     println!("{}", command);
//! }
//! # Ok::<(), clonerun::DetectError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`acquire`]: local copy management
//! - [`detection`]: project signals and workflow command extraction
//! - [`resolve`]: run-candidate selection rules
//! - [`orchestrator`]: interactive selection and process supervision
//! - [`pipeline`]: the end-to-end flow
//! - [`exec`]: shell command execution
//! - [`fs`]: filesystem abstraction

pub mod acquire;
pub mod cli;
pub mod config;
pub mod detection;
pub mod exec;
pub mod fs;
pub mod orchestrator;
pub mod pipeline;
pub mod resolve;
pub mod util;

pub use acquire::{AcquireError, LocalCopy, RepositoryAcquirer};
pub use config::{ClonerunConfig, ConfigError};
pub use detection::{DetectError, DetectionWarning, ProjectSignals, WorkflowCommands};
pub use exec::{CommandExecutor, ExecError, ExecutionResult, Shell, ShellExecutor};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use orchestrator::{OrchestratorError, RunOrchestrator, RunOutcome};
pub use pipeline::{analyze, Analysis, ClonePipeline, PipelineError};
pub use resolve::{CandidateSource, Resolution, RunCandidate, RunStepResolver};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
