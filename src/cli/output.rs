//! Output formatting for `detect` and `config`
//!
//! JSON and YAML serialize the underlying types directly. The human format is a
//! short report meant for a terminal.

use anyhow::{Context, Result};
use std::fmt::Write as _;

use crate::config::ClonerunConfig;
use crate::pipeline::Analysis;
use crate::resolve::CandidateSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result of analyzing a checkout
    pub fn format_analysis(&self, analysis: &Analysis) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(analysis)
                .context("Failed to serialize analysis to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(analysis).context("Failed to serialize analysis to YAML")
            }
            OutputFormat::Human => Ok(self.format_analysis_human(analysis)),
        }
    }

    pub fn format_config(&self, config: &ClonerunConfig) -> Result<String> {
        let config_map = config.to_display_map();
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config_map)
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&config_map).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(format!("{}", config)),
        }
    }

    // Human-readable formatting

    fn format_analysis_human(&self, analysis: &Analysis) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "Run Detection: {}", analysis.repo_path.display());
        let _ = writeln!(output, "{}\n", RULE);

        let build_systems = analysis.signals.build_systems();
        if build_systems.is_empty() {
            output.push_str("Build Systems: (none)\n");
        } else {
            let _ = writeln!(output, "Build Systems: {}", build_systems.join(", "));
        }

        if analysis.signals.has_workflows {
            output.push_str("\nWorkflows:\n");
            if analysis.workflows.is_empty() {
                output.push_str("  (no workflow files)\n");
            }
            for workflow in &analysis.workflows {
                let _ = writeln!(
                    output,
                    "  {} ({} run commands)",
                    workflow.file,
                    workflow.commands.len()
                );
            }
        }

        output.push_str("\nRun Candidates:\n");
        if analysis.candidates.is_empty() {
            output.push_str("  (none) - check the project's README for instructions\n");
        }
        for (index, candidate) in analysis.candidates.iter().enumerate() {
            let _ = writeln!(
                output,
                "  {}. {}  [{}]",
                index + 1,
                candidate.command,
                source_label(&candidate.source)
            );
        }

        if !analysis.warnings.is_empty() {
            output.push_str("\nWarnings:\n");
            for warning in &analysis.warnings {
                let _ = writeln!(output, "  - {}", warning);
            }
        }

        output
    }
}

fn source_label(source: &CandidateSource) -> String {
    match source {
        CandidateSource::Workflow { file } => format!("workflow {}", file),
        CandidateSource::PackageScripts => "package.json".to_string(),
        CandidateSource::Composer => "composer.json".to_string(),
        CandidateSource::Python => "requirements.txt".to_string(),
        CandidateSource::DockerCompose => "docker-compose".to_string(),
        CandidateSource::Makefile => "Makefile".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DetectionWarning, ProjectSignals, WorkflowCommands};
    use crate::resolve::RunCandidate;
    use std::path::PathBuf;

    fn create_test_analysis() -> Analysis {
        Analysis {
            repo_path: PathBuf::from("/tmp/widget"),
            signals: ProjectSignals::from_listing(
                vec!["package.json".to_string(), ".github".to_string()],
                Some(vec!["ci.yml".to_string()]),
            ),
            workflows: vec![WorkflowCommands {
                file: "ci.yml".to_string(),
                commands: vec!["npm ci".to_string(), "npm run start:prod".to_string()],
            }],
            candidates: vec![RunCandidate::new(
                "npm run start:prod",
                CandidateSource::Workflow {
                    file: "ci.yml".to_string(),
                },
            )],
            warnings: vec![DetectionWarning::ManifestParse {
                file: "package.json".to_string(),
                reason: "expected value".to_string(),
            }],
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_analysis(&create_test_analysis()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["candidates"][0]["command"], "npm run start:prod");
        assert_eq!(parsed["candidates"][0]["source"]["type"], "workflow");
        assert_eq!(parsed["signals"]["has_package_json"], true);
    }

    #[test]
    fn test_yaml_format() {
        let formatter = OutputFormatter::new(OutputFormat::Yaml);
        let output = formatter.format_analysis(&create_test_analysis()).unwrap();

        let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(
            parsed["candidates"][0]["command"].as_str(),
            Some("npm run start:prod")
        );
    }

    #[test]
    fn test_human_format() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_analysis(&create_test_analysis()).unwrap();

        assert!(output.contains("Build Systems: npm"));
        assert!(output.contains("ci.yml (2 run commands)"));
        assert!(output.contains("1. npm run start:prod  [workflow ci.yml]"));
        assert!(output.contains("Warnings:"));
    }

    #[test]
    fn test_human_format_without_candidates() {
        let mut analysis = create_test_analysis();
        analysis.candidates.clear();
        analysis.warnings.clear();

        let output = OutputFormatter::new(OutputFormat::Human)
            .format_analysis(&analysis)
            .unwrap();
        assert!(output.contains("(none)"));
        assert!(!output.contains("Warnings:"));
    }

    #[test]
    fn test_config_formats() {
        let config = ClonerunConfig {
            workdir: PathBuf::from("/work"),
            checkout_name: None,
            git_program: "git".to_string(),
            shell: "sh".to_string(),
            grace_period_secs: 5,
            log_level: "info".to_string(),
        };

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_config(&config)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["git_program"], "git");
        assert_eq!(parsed["grace_period_secs"], "5");

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_config(&config)
            .unwrap();
        assert!(human.contains("Clonerun Configuration:"));
        assert!(human.contains("Shell: sh"));
    }
}
