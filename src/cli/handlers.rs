//! Command handlers
//!
//! Each handler returns the process exit code. Errors are reported here, not
//! propagated to `main`.

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::commands::{ConfigArgs, DetectArgs, RunArgs};
use super::output::OutputFormatter;
use crate::acquire::AcquireError;
use crate::config::ClonerunConfig;
use crate::exec::{Shell, ShellExecutor};
use crate::fs::RealFileSystem;
use crate::orchestrator::RunOutcome;
use crate::pipeline::{analyze, ctrl_c_signal, ClonePipeline, PipelineError};

pub async fn handle_run(args: &RunArgs) -> i32 {
    let mut config = ClonerunConfig::default();
    if let Some(workdir) = &args.workdir {
        config.workdir = workdir.clone();
    }
    if let Some(dir) = &args.dir {
        config.checkout_name = Some(dir.clone());
    }
    if let Some(secs) = args.grace_period {
        config.grace_period_secs = secs;
    }

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }
    debug!(?config, "Effective configuration");

    let executor = Arc::new(ShellExecutor::new(Shell::new(config.shell.clone())));
    let pipeline = ClonePipeline::new(&config, executor, Arc::new(RealFileSystem::new()))
        .with_auto_select(args.yes);

    let mut input = io::stdin().lock();
    let mut output = io::stdout();

    match pipeline
        .run(&args.url, &mut input, &mut output, ctrl_c_signal())
        .await
    {
        Ok(RunOutcome::Unresolved) => 0,
        Ok(RunOutcome::Exited { command, status }) => {
            info!(command = %command, status, "Command finished");
            0
        }
        Ok(RunOutcome::Interrupted {
            command,
            termination,
        }) => {
            info!(command = %command, ?termination, "Command interrupted");
            0
        }
        Err(PipelineError::Acquire(AcquireError::CloneFailure { url, status, stderr })) => {
            error!(url = %url, status, "Clone failed");
            eprintln!("Error cloning repository: {}", stderr);
            1
        }
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

pub async fn handle_detect(args: &DetectArgs) -> i32 {
    let repo_path = match &args.repository_path {
        Some(path) => path.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return 1;
            }
        },
    };
    debug!("Repository path: {}", repo_path.display());

    if !repo_path.exists() {
        error!("Repository path does not exist: {}", repo_path.display());
        return 1;
    }

    if !repo_path.is_dir() {
        error!(
            "Repository path is not a directory: {}",
            repo_path.display()
        );
        return 1;
    }

    let repo_path: PathBuf = match repo_path.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to canonicalize repository path: {}", e);
            return 1;
        }
    };

    let analysis = match analyze(&RealFileSystem::new(), &repo_path) {
        Ok(analysis) => analysis,
        Err(e) => {
            error!("Detection failed: {}", e);
            return 1;
        }
    };

    match OutputFormatter::new(args.format.into()).format_analysis(&analysis) {
        Ok(report) => {
            println!("{}", report);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}

pub async fn handle_config(args: &ConfigArgs) -> i32 {
    let config = ClonerunConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }

    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(report) => {
            println!("{}", report);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}
