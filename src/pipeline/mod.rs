//! End-to-end flow: acquire, analyze, run
//!
//! ```text
//! RepositoryAcquirer -> detect -> collect_workflow_commands -> RunStepResolver -> RunOrchestrator
//! ```
//!
//! Only a failed clone stops the pipeline with an error that callers should turn
//! into a non-zero exit. An empty candidate list ends in [`RunOutcome::Unresolved`].

pub mod analysis;

pub use analysis::{analyze, Analysis};

use crate::acquire::{AcquireError, RepositoryAcquirer};
use crate::config::ClonerunConfig;
use crate::detection::DetectError;
use crate::exec::CommandExecutor;
use crate::fs::FileSystem;
use crate::orchestrator::{OrchestratorError, RunOrchestrator, RunOutcome};
use std::future::Future;
use std::io::{BufRead, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

impl PipelineError {
    pub fn is_clone_failure(&self) -> bool {
        matches!(self, PipelineError::Acquire(AcquireError::CloneFailure { .. }))
    }
}

pub struct ClonePipeline {
    acquirer: RepositoryAcquirer,
    orchestrator: RunOrchestrator,
    fs: Arc<dyn FileSystem>,
}

impl ClonePipeline {
    pub fn new(
        config: &ClonerunConfig,
        executor: Arc<dyn CommandExecutor>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            acquirer: RepositoryAcquirer::from_config(Arc::clone(&executor), config),
            orchestrator: RunOrchestrator::new(executor).with_grace_period(config.grace_period()),
            fs,
        }
    }

    pub fn with_auto_select(mut self, auto_select: bool) -> Self {
        self.orchestrator = self.orchestrator.with_auto_select(auto_select);
        self
    }

    pub async fn run<R, W, F>(
        &self,
        remote_url: &str,
        input: &mut R,
        output: &mut W,
        cancel: F,
    ) -> Result<RunOutcome, PipelineError>
    where
        R: BufRead,
        W: Write,
        F: Future<Output = ()>,
    {
        info!(url = remote_url, "Starting clone and run");

        let copy = self.acquirer.ensure_local_copy(remote_url).await?;
        if copy.reused {
            writeln!(output, "Repository directory already exists. Continuing...")
                .map_err(OrchestratorError::from)?;
        }

        let analysis = analyze(self.fs.as_ref(), &copy.path)?;
        for warning in &analysis.warnings {
            warn!(%warning, "Detection warning");
        }

        let outcome = self
            .orchestrator
            .run(&analysis.candidates, &copy.path, input, output, cancel)
            .await?;

        Ok(outcome)
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
pub async fn ctrl_c_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, interruption disabled");
        std::future::pending::<()>().await;
    }
}
