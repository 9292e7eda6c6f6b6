//! Build-system signals from a single top-level directory listing

use crate::fs::FileSystem;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Workflow directory, relative to the repository root
pub const WORKFLOWS_DIR: &str = ".github/workflows";

pub const PACKAGE_MANIFEST: &str = "package.json";
pub const COMPOSER_MANIFEST: &str = "composer.json";
pub const PYTHON_REQUIREMENTS: &str = "requirements.txt";
pub const MAVEN_DESCRIPTOR: &str = "pom.xml";
pub const GRADLE_DESCRIPTORS: &[&str] = &["build.gradle", "build.gradle.kts"];
pub const COMPOSE_FILES: &[&str] = &["docker-compose.yml", "docker-compose.yaml"];
pub const MAKEFILE: &str = "Makefile";

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Failed to list repository directory {path}: {reason}")]
    ListFailed { path: PathBuf, reason: String },
}

/// What the top level of a checkout looks like
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectSignals {
    pub has_package_json: bool,
    pub has_composer_json: bool,
    pub has_requirements_txt: bool,
    pub has_pom_xml: bool,
    pub has_gradle: bool,
    pub has_docker_compose: bool,
    pub has_makefile: bool,
    pub has_workflows: bool,
    /// Entries of the workflow directory, sorted by name
    pub workflow_files: Vec<String>,
    /// Top-level entries of the repository, sorted by name
    pub files: Vec<String>,
}

impl ProjectSignals {
    /// Derives the flags from the listings; `None` means no workflow directory
    pub fn from_listing(mut files: Vec<String>, workflow_files: Option<Vec<String>>) -> Self {
        files.sort();
        let has = |name: &str| files.iter().any(|f| f == name);
        let has_any = |names: &[&str]| names.iter().any(|n| has(n));

        let has_workflows = workflow_files.is_some();
        let mut workflow_files = workflow_files.unwrap_or_default();
        workflow_files.sort();

        Self {
            has_package_json: has(PACKAGE_MANIFEST),
            has_composer_json: has(COMPOSER_MANIFEST),
            has_requirements_txt: has(PYTHON_REQUIREMENTS),
            has_pom_xml: has(MAVEN_DESCRIPTOR),
            has_gradle: has_any(GRADLE_DESCRIPTORS),
            has_docker_compose: has_any(COMPOSE_FILES),
            has_makefile: has(MAKEFILE),
            has_workflows,
            workflow_files,
            files,
        }
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }

    /// Names of the recognised build systems, for reporting
    pub fn build_systems(&self) -> Vec<&'static str> {
        [
            (self.has_package_json, "npm"),
            (self.has_composer_json, "composer"),
            (self.has_requirements_txt, "pip"),
            (self.has_pom_xml, "maven"),
            (self.has_gradle, "gradle"),
            (self.has_docker_compose, "docker-compose"),
            (self.has_makefile, "make"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }
}

/// Lists `repo_path` and its workflow directory once each
///
/// A missing workflow directory is not an error. An unreadable one is logged and
/// treated as empty.
pub fn detect(fs: &dyn FileSystem, repo_path: &Path) -> Result<ProjectSignals, DetectError> {
    let files = fs
        .read_dir(repo_path)
        .map_err(|e| DetectError::ListFailed {
            path: repo_path.to_path_buf(),
            reason: e.to_string(),
        })?
        .into_iter()
        .map(|entry| entry.name)
        .collect();

    let workflows_path = repo_path.join(WORKFLOWS_DIR);
    let workflow_files = if fs.is_dir(&workflows_path) {
        match fs.read_dir(&workflows_path) {
            Ok(entries) => Some(entries.into_iter().map(|entry| entry.name).collect()),
            Err(e) => {
                warn!(path = %workflows_path.display(), error = %e, "Failed to list workflow directory");
                Some(Vec::new())
            }
        }
    } else {
        None
    };

    let signals = ProjectSignals::from_listing(files, workflow_files);

    debug!(
        repo = %repo_path.display(),
        build_systems = ?signals.build_systems(),
        workflows = signals.workflow_files.len(),
        "Detected project signals"
    );

    Ok(signals)
}
