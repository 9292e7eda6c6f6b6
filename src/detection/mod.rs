//! Repository inspection
//!
//! - [`signals`]: which build-system marker files sit at the top of a checkout
//! - [`workflow`]: shell commands declared as `run:` steps in CI workflow files
//!
//! Problems reading individual files are reported as [`DetectionWarning`]s; they
//! never abort detection.

pub mod signals;
pub mod workflow;

pub use signals::{detect, DetectError, ProjectSignals, WORKFLOWS_DIR};
pub use workflow::{collect_workflow_commands, extract_run_commands, WorkflowCommands};

use serde::Serialize;
use std::fmt;

/// A recoverable problem encountered while inspecting a checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionWarning {
    /// A workflow file could not be read; it contributes no commands
    WorkflowParse { file: String, reason: String },
    /// A manifest could not be read or parsed; its signal falls back to a default command
    ManifestParse { file: String, reason: String },
}

impl fmt::Display for DetectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionWarning::WorkflowParse { file, reason } => {
                write!(f, "Could not parse workflow file {}: {}", file, reason)
            }
            DetectionWarning::ManifestParse { file, reason } => {
                write!(f, "Could not parse manifest {}: {}", file, reason)
            }
        }
    }
}
