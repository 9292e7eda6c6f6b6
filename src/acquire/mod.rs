//! Repository acquisition
//!
//! Ensures a local working copy of a remote repository exists. An existing
//! directory is reused as-is (no fetch or pull), otherwise the repository is
//! cloned through the [`CommandExecutor`].

use crate::config::{repo_dir_name, ClonerunConfig};
use crate::exec::{CommandExecutor, ExecError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AcquireError {
    /// The clone command ran but exited non-zero
    #[error("Failed to clone {url} (exit status {status}): {stderr}")]
    CloneFailure {
        url: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to run clone command: {0}")]
    Exec(#[from] ExecError),

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The working copy handed to detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCopy {
    /// Absolute path of the working copy
    pub path: PathBuf,
    /// True when an existing directory was reused instead of cloned
    pub reused: bool,
}

pub struct RepositoryAcquirer {
    executor: Arc<dyn CommandExecutor>,
    workdir: PathBuf,
    checkout_name: Option<String>,
    git_program: String,
}

impl RepositoryAcquirer {
    pub fn new(executor: Arc<dyn CommandExecutor>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            workdir: workdir.into(),
            checkout_name: None,
            git_program: "git".to_string(),
        }
    }

    pub fn from_config(executor: Arc<dyn CommandExecutor>, config: &ClonerunConfig) -> Self {
        Self {
            executor,
            workdir: config.workdir.clone(),
            checkout_name: config.checkout_name.clone(),
            git_program: config.git_program.clone(),
        }
    }

    pub fn with_checkout_name(mut self, name: impl Into<String>) -> Self {
        self.checkout_name = Some(name.into());
        self
    }

    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    fn dir_name(&self, remote_url: &str) -> String {
        self.checkout_name
            .clone()
            .unwrap_or_else(|| repo_dir_name(remote_url))
    }

    /// Returns the working copy for `remote_url`, cloning it if needed
    ///
    /// # Errors
    ///
    /// `AcquireError::CloneFailure` when the clone command exits non-zero; callers
    /// are expected to stop the pipeline.
    pub async fn ensure_local_copy(&self, remote_url: &str) -> Result<LocalCopy, AcquireError> {
        let dir_name = self.dir_name(remote_url);
        let dest = self.workdir.join(&dir_name);

        if dest.exists() {
            info!(path = %dest.display(), "Repository directory already exists, reusing it");
            return Ok(LocalCopy {
                path: absolute(&dest)?,
                reused: true,
            });
        }

        std::fs::create_dir_all(&self.workdir).map_err(|source| AcquireError::Io {
            path: self.workdir.clone(),
            source,
        })?;

        info!(url = remote_url, dest = %dest.display(), "Cloning repository");

        let command = format!(
            "{} clone {} {}",
            self.git_program,
            shell_quote(remote_url),
            shell_quote(&dir_name)
        );
        let result = self
            .executor
            .run_captured(&command, Some(&self.workdir))
            .await?;

        if !result.success() {
            return Err(AcquireError::CloneFailure {
                url: remote_url.to_string(),
                status: result.status,
                stderr: result.stderr.trim().to_string(),
            });
        }

        debug!(stdout = %result.stdout.trim(), "Clone finished");

        Ok(LocalCopy {
            path: absolute(&dest)?,
            reused: false,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, AcquireError> {
    path.canonicalize().map_err(|source| AcquireError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// POSIX single-quote quoting; plain words are left untouched
pub fn shell_quote(arg: &str) -> String {
    let is_plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@+=,%".contains(c));

    if is_plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExecutionResult, RecordingExecutor};
    use tempfile::TempDir;

    fn cloning_executor() -> RecordingExecutor {
        // Simulates `git clone <url> <dir>` by creating <dir> in the working dir
        RecordingExecutor::new().on_captured(|command, working_dir| {
            if let (Some(dir), Some(name)) = (working_dir, command.split_whitespace().last()) {
                std::fs::create_dir_all(dir.join(name.trim_matches('\''))).unwrap();
            }
        })
    }

    #[tokio::test]
    async fn test_clones_when_missing() {
        let temp = TempDir::new().unwrap();
        let executor = Arc::new(cloning_executor());
        let acquirer = RepositoryAcquirer::new(executor.clone(), temp.path());

        let copy = acquirer
            .ensure_local_copy("https://github.com/acme/widget.git")
            .await
            .unwrap();

        assert!(!copy.reused);
        assert_eq!(copy.path, temp.path().join("widget").canonicalize().unwrap());

        let calls = executor.captured_commands();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].command,
            "git clone https://github.com/acme/widget.git widget"
        );
        assert_eq!(calls[0].working_dir.as_deref(), Some(temp.path()));
    }

    #[tokio::test]
    async fn test_existing_directory_is_reused_without_cloning() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("widget")).unwrap();

        let executor = Arc::new(RecordingExecutor::new());
        let acquirer = RepositoryAcquirer::new(executor.clone(), temp.path());

        let first = acquirer
            .ensure_local_copy("https://github.com/acme/widget.git")
            .await
            .unwrap();
        let second = acquirer
            .ensure_local_copy("https://github.com/acme/widget.git")
            .await
            .unwrap();

        assert!(first.reused);
        assert_eq!(first, second);
        assert!(executor.captured_commands().is_empty());
    }

    #[tokio::test]
    async fn test_second_call_after_clone_does_not_clone_again() {
        let temp = TempDir::new().unwrap();
        let executor = Arc::new(cloning_executor());
        let acquirer = RepositoryAcquirer::new(executor.clone(), temp.path());

        let first = acquirer.ensure_local_copy("https://example.com/app").await.unwrap();
        let second = acquirer.ensure_local_copy("https://example.com/app").await.unwrap();

        assert_eq!(first.path, second.path);
        assert!(second.reused);
        assert_eq!(executor.captured_commands().len(), 1);
    }

    #[tokio::test]
    async fn test_clone_failure_carries_stderr() {
        let temp = TempDir::new().unwrap();
        let executor = Arc::new(RecordingExecutor::new().with_captured_result(ExecutionResult {
            stdout: String::new(),
            stderr: "fatal: repository not found\n".to_string(),
            status: 128,
        }));
        let acquirer = RepositoryAcquirer::new(executor, temp.path());

        let err = acquirer
            .ensure_local_copy("https://github.com/acme/missing.git")
            .await
            .unwrap_err();

        match err {
            AcquireError::CloneFailure { status, stderr, url } => {
                assert_eq!(status, 128);
                assert_eq!(stderr, "fatal: repository not found");
                assert_eq!(url, "https://github.com/acme/missing.git");
            }
            other => panic!("Expected CloneFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_explicit_checkout_name_and_git_program() {
        let temp = TempDir::new().unwrap();
        let executor = Arc::new(RecordingExecutor::new().on_captured(|_, working_dir| {
            std::fs::create_dir_all(working_dir.unwrap().join("my checkout")).unwrap();
        }));
        let acquirer = RepositoryAcquirer::new(executor.clone(), temp.path())
            .with_checkout_name("my checkout")
            .with_git_program("/opt/git/bin/git");

        let copy = acquirer
            .ensure_local_copy("https://github.com/acme/widget.git")
            .await
            .unwrap();

        assert!(copy.path.ends_with("my checkout"));
        assert_eq!(
            executor.captured_commands()[0].command,
            "/opt/git/bin/git clone https://github.com/acme/widget.git 'my checkout'"
        );
    }

    #[tokio::test]
    async fn test_from_config_places_checkout_under_workdir() {
        let temp = TempDir::new().unwrap();
        let workdir = temp.path().join("checkouts");
        let config = ClonerunConfig {
            workdir: workdir.clone(),
            checkout_name: Some("widget-dev".to_string()),
            git_program: "git".to_string(),
            shell: "sh".to_string(),
            grace_period_secs: 5,
            log_level: "info".to_string(),
        };
        let executor = Arc::new(cloning_executor());
        let acquirer = RepositoryAcquirer::from_config(executor.clone(), &config);

        let copy = acquirer
            .ensure_local_copy("https://github.com/acme/widget.git")
            .await
            .unwrap();

        assert_eq!(copy.path, workdir.join("widget-dev").canonicalize().unwrap());
        let calls = executor.captured_commands();
        assert_eq!(
            calls[0].command,
            "git clone https://github.com/acme/widget.git widget-dev"
        );
        assert_eq!(calls[0].working_dir.as_deref(), Some(workdir.as_path()));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("widget"), "widget");
        assert_eq!(
            shell_quote("git@github.com:acme/widget.git"),
            "git@github.com:acme/widget.git"
        );
        assert_eq!(shell_quote("two words"), "'two words'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
