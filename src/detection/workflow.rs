//! Shell commands from CI workflow files
//!
//! A line-oriented scan rather than a YAML parse: every `run:` step value is
//! returned, either from the same line or from the indented block that follows
//! an empty (or block-scalar) value. No filtering happens here.

use super::{DetectionWarning, ProjectSignals, WORKFLOWS_DIR};
use crate::fs::FileSystem;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

const RUN_DIRECTIVE: &str = "run:";

/// Commands extracted from one workflow file, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowCommands {
    pub file: String,
    pub commands: Vec<String>,
}

/// Extracts every `run:` value from workflow text
///
/// ```
/// use clonerun::detection::extract_run_commands;
///
/// assert_eq!(extract_run_commands("run: echo hi"), vec!["echo hi"]);
/// assert_eq!(
///     extract_run_commands("run:\n  echo a\n  echo b\n"),
///     vec!["echo a\necho b"]
/// );
/// ```
pub fn extract_run_commands(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut commands = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        let Some(value) = directive_value(line.trim()) else {
            continue;
        };

        if !value.is_empty() && !is_block_indicator(value) {
            commands.push(value.to_string());
            continue;
        }

        // The block is whatever sits deeper than the directive itself. A line at
        // the directive's own indentation is the next key of the same step, so it
        // ends the block even when it is indented relative to column 0. Blank
        // lines belong to the block, as they do inside a YAML block scalar.
        let base_indent = indent_width(line);
        let mut block = Vec::new();
        while i < lines.len() {
            let next = lines[i];
            if next.trim().is_empty() {
                i += 1;
                continue;
            }
            if indent_width(next) <= base_indent {
                break;
            }
            block.push(next.trim());
            i += 1;
        }

        if !block.is_empty() {
            commands.push(block.join("\n"));
        }
    }

    commands
}

/// Value after `run:` (or the list-item form `- run:`), trimmed
fn directive_value(trimmed: &str) -> Option<&str> {
    let step = trimmed
        .strip_prefix('-')
        .map(str::trim_start)
        .unwrap_or(trimmed);
    step.strip_prefix(RUN_DIRECTIVE).map(str::trim)
}

/// YAML block scalar headers such as `|`, `>-` or `|+`
fn is_block_indicator(value: &str) -> bool {
    matches!(value, "|" | "|-" | "|+" | ">" | ">-" | ">+")
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Reads and scans every YAML file in the workflow directory
///
/// Files that cannot be read contribute nothing and produce a warning.
pub fn collect_workflow_commands(
    fs: &dyn FileSystem,
    repo_path: &Path,
    signals: &ProjectSignals,
    warnings: &mut Vec<DetectionWarning>,
) -> Vec<WorkflowCommands> {
    if !signals.has_workflows {
        return Vec::new();
    }

    let workflows_dir = repo_path.join(WORKFLOWS_DIR);
    let mut collected = Vec::new();

    for file in signals.workflow_files.iter().filter(|f| is_workflow_file(f)) {
        let path = workflows_dir.join(file);

        let text = match fs.read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                let warning = DetectionWarning::WorkflowParse {
                    file: file.clone(),
                    reason: e.to_string(),
                };
                warn!(file = %file, error = %e, "Skipping unreadable workflow file");
                warnings.push(warning);
                continue;
            }
        };

        if text.contains('\0') {
            warn!(file = %file, "Skipping workflow file with binary content");
            warnings.push(DetectionWarning::WorkflowParse {
                file: file.clone(),
                reason: "file contains binary content".to_string(),
            });
            continue;
        }

        let commands = extract_run_commands(&text);
        debug!(file = %file, count = commands.len(), "Extracted workflow commands");

        collected.push(WorkflowCommands {
            file: file.clone(),
            commands,
        });
    }

    collected
}

fn is_workflow_file(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}
