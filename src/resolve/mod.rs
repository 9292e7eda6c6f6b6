//! Run-step resolution
//!
//! Turns detection output into an ordered list of candidate commands:
//!
//! 1. Workflow `run:` commands mentioning `start`, `run`, `serve` or `dev`
//!    (case-insensitive), across files in order.
//! 2. Only when step 1 finds nothing: exactly one static rule, chosen by the first
//!    present signal in the order package.json, composer.json, requirements.txt,
//!    docker-compose, Makefile.
//!
//! Commands are never deduplicated. A rule never names a file that is missing from
//! the top-level listing.

mod rules;

pub use rules::{
    makefile_targets, package_script_command, python_entry_command, MAKE_TARGETS,
    SCRIPT_PREFERENCE,
};

use crate::detection::{DetectionWarning, ProjectSignals, WorkflowCommands};
use crate::fs::FileSystem;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Substrings that mark a workflow command as a way to start the project
pub const RUN_KEYWORDS: &[&str] = &["start", "run", "serve", "dev"];

pub const COMPOSER_SERVE_COMMAND: &str = "php -S 0.0.0.0:5000";
pub const COMPOSE_UP_COMMAND: &str = "docker-compose up";

/// Where a candidate came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CandidateSource {
    Workflow { file: String },
    PackageScripts,
    Composer,
    Python,
    DockerCompose,
    Makefile,
}

/// A shell command believed to start the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunCandidate {
    pub command: String,
    pub source: CandidateSource,
}

impl RunCandidate {
    pub fn new(command: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            command: command.into(),
            source,
        }
    }
}

/// Candidates in priority order, plus anything that went wrong on the way
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub candidates: Vec<RunCandidate>,
    pub warnings: Vec<DetectionWarning>,
}

impl Resolution {
    pub fn commands(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.command.as_str()).collect()
    }

    pub fn is_unresolved(&self) -> bool {
        self.candidates.is_empty()
    }
}

pub fn matches_run_keyword(command: &str) -> bool {
    let lower = command.to_lowercase();
    RUN_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Resolves candidates for the checkout at `repo_path`
///
/// Manifests (package.json, Makefile) are read through `fs` only when their rule
/// is the one that applies.
pub struct RunStepResolver<'a> {
    fs: &'a dyn FileSystem,
    repo_path: &'a Path,
}

impl<'a> RunStepResolver<'a> {
    pub fn new(fs: &'a dyn FileSystem, repo_path: &'a Path) -> Self {
        Self { fs, repo_path }
    }

    pub fn resolve(
        &self,
        signals: &ProjectSignals,
        workflow_commands: &[WorkflowCommands],
    ) -> Resolution {
        let mut resolution = Resolution::default();

        for workflow in workflow_commands {
            for command in workflow.commands.iter().filter(|c| matches_run_keyword(c)) {
                resolution.candidates.push(RunCandidate::new(
                    command.clone(),
                    CandidateSource::Workflow {
                        file: workflow.file.clone(),
                    },
                ));
            }
        }

        if !resolution.candidates.is_empty() {
            info!(
                count = resolution.candidates.len(),
                "Found run commands in workflow files"
            );
            return resolution;
        }

        debug!("No workflow run commands, falling back to build-system rules");

        if let Some(candidate) = self.static_candidate(signals, &mut resolution.warnings) {
            info!(command = %candidate.command, source = ?candidate.source, "Resolved run command from build files");
            resolution.candidates.push(candidate);
        }

        resolution
    }

    fn static_candidate(
        &self,
        signals: &ProjectSignals,
        warnings: &mut Vec<DetectionWarning>,
    ) -> Option<RunCandidate> {
        if signals.has_package_json {
            let command = rules::package_json_command(self.fs, self.repo_path, warnings);
            Some(RunCandidate::new(command, CandidateSource::PackageScripts))
        } else if signals.has_composer_json {
            Some(RunCandidate::new(
                COMPOSER_SERVE_COMMAND,
                CandidateSource::Composer,
            ))
        } else if signals.has_requirements_txt {
            python_entry_command(&signals.files)
                .map(|command| RunCandidate::new(command, CandidateSource::Python))
        } else if signals.has_docker_compose {
            Some(RunCandidate::new(
                COMPOSE_UP_COMMAND,
                CandidateSource::DockerCompose,
            ))
        } else if signals.has_makefile {
            let command = rules::makefile_command(self.fs, self.repo_path, warnings);
            Some(RunCandidate::new(command, CandidateSource::Makefile))
        } else {
            None
        }
    }
}
