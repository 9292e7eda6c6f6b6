//! Configuration management for clonerun
//!
//! Settings are loaded from environment variables with sensible defaults, and
//! the CLI overrides individual fields afterwards.
//!
//! # Environment Variables
//!
//! - `CLONERUN_WORKDIR`: Directory the local copy is created in - default: current directory
//! - `CLONERUN_GIT`: Version-control program used for cloning - default: "git"
//! - `CLONERUN_SHELL`: Shell used to interpret commands - default: "sh" ("cmd" on Windows)
//! - `CLONERUN_GRACE_PERIOD_SECS`: Seconds to wait after a graceful stop before killing - default: "5"
//! - `CLONERUN_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use clonerun::ClonerunConfig;
//!
//! let mut config = ClonerunConfig::default();
//! config.checkout_name = Some("demo".to_string());
//! config.validate().expect("Invalid configuration");
//!
//! println!("{}", config);
//! ```

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_GIT_PROGRAM: &str = "git";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_GRACE_PERIOD_SECS: u64 = 5;
const MAX_GRACE_PERIOD_SECS: u64 = 300;

#[cfg(windows)]
const DEFAULT_SHELL: &str = "cmd";
#[cfg(not(windows))]
const DEFAULT_SHELL: &str = "sh";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for clonerun
///
/// `Default::default()` reads `CLONERUN_*` environment variables and falls back to
/// the defaults listed in the module docs.
#[derive(Debug, Clone)]
pub struct ClonerunConfig {
    /// Parent directory of the local copy
    pub workdir: PathBuf,

    /// Explicit local directory name; derived from the remote URL when `None`
    pub checkout_name: Option<String>,

    /// Version-control program used for `clone`
    pub git_program: String,

    /// Shell that interprets discovered commands
    pub shell: String,

    /// Seconds between the graceful stop request and the force kill
    pub grace_period_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ClonerunConfig {
    fn default() -> Self {
        let workdir = env::var("CLONERUN_WORKDIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let git_program =
            env::var("CLONERUN_GIT").unwrap_or_else(|_| DEFAULT_GIT_PROGRAM.to_string());

        let shell = env::var("CLONERUN_SHELL").unwrap_or_else(|_| DEFAULT_SHELL.to_string());

        let grace_period_secs = env::var("CLONERUN_GRACE_PERIOD_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_GRACE_PERIOD_SECS);

        let log_level = env::var("CLONERUN_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            workdir,
            checkout_name: None,
            git_program,
            shell,
            grace_period_secs,
            log_level,
        }
    }
}

impl ClonerunConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any field is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grace_period_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Grace period must be at least 1 second".to_string(),
            ));
        }
        if self.grace_period_secs > MAX_GRACE_PERIOD_SECS {
            return Err(ConfigError::ValidationFailed(format!(
                "Grace period cannot exceed {} seconds",
                MAX_GRACE_PERIOD_SECS
            )));
        }

        if self.git_program.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Version-control program must not be empty".to_string(),
            ));
        }
        if self.shell.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Shell must not be empty".to_string(),
            ));
        }

        if let Some(name) = &self.checkout_name {
            if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid checkout directory name: {:?}",
                    name
                )));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> std::collections::BTreeMap<String, String> {
        let mut map = std::collections::BTreeMap::new();

        map.insert("workdir".to_string(), self.workdir.display().to_string());
        if let Some(ref name) = self.checkout_name {
            map.insert("checkout_name".to_string(), name.clone());
        }
        map.insert("git_program".to_string(), self.git_program.clone());
        map.insert("shell".to_string(), self.shell.clone());
        map.insert(
            "grace_period_secs".to_string(),
            self.grace_period_secs.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for ClonerunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Clonerun Configuration:")?;
        writeln!(f, "  Workdir: {}", self.workdir.display())?;
        if let Some(ref name) = self.checkout_name {
            writeln!(f, "  Checkout Name: {}", name)?;
        }
        writeln!(f, "  Git Program: {}", self.git_program)?;
        writeln!(f, "  Shell: {}", self.shell)?;
        writeln!(f, "  Grace Period: {}s", self.grace_period_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

/// Local directory name for a remote: last path segment without `.git`
///
/// `https://github.com/acme/widget.git` -> `widget`,
/// `git@github.com:acme/widget` -> `widget`
pub fn repo_dir_name(remote_url: &str) -> String {
    let trimmed = remote_url.trim().trim_end_matches('/');
    let last = trimmed
        .rsplit(['/', ':', '\\'])
        .next()
        .unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);

    if name.is_empty() || name == "." || name == ".." {
        "repository".to_string()
    } else {
        name.to_string()
    }
}
