//! Detection, extraction and resolution against an existing checkout

use crate::detection::{
    collect_workflow_commands, detect, DetectError, DetectionWarning, ProjectSignals,
    WorkflowCommands,
};
use crate::fs::FileSystem;
use crate::resolve::{Resolution, RunCandidate, RunStepResolver};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Everything learned about a checkout before anything is launched
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub repo_path: PathBuf,
    pub signals: ProjectSignals,
    pub workflows: Vec<WorkflowCommands>,
    pub candidates: Vec<RunCandidate>,
    pub warnings: Vec<DetectionWarning>,
}

impl Analysis {
    pub fn commands(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.command.as_str()).collect()
    }
}

/// Runs detector, extractor and resolver in sequence
pub fn analyze(fs: &dyn FileSystem, repo_path: &Path) -> Result<Analysis, DetectError> {
    let start = Instant::now();

    let signals = detect(fs, repo_path)?;

    let mut warnings = Vec::new();
    let workflows = collect_workflow_commands(fs, repo_path, &signals, &mut warnings);

    let Resolution {
        candidates,
        warnings: mut resolve_warnings,
    } = RunStepResolver::new(fs, repo_path).resolve(&signals, &workflows);
    warnings.append(&mut resolve_warnings);

    info!(
        repo = %repo_path.display(),
        candidates = candidates.len(),
        warnings = warnings.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Analysis completed"
    );

    Ok(Analysis {
        repo_path: repo_path.to_path_buf(),
        signals,
        workflows,
        candidates,
        warnings,
    })
}
