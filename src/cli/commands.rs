use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Clone a repository and work out how to run it
#[derive(Parser, Debug)]
#[command(
    name = "clonerun",
    about = "Clone a repository and work out how to run it",
    version,
    long_about = "clonerun clones a repository, inspects its CI workflows and build files \
                  (package.json, composer.json, requirements.txt, docker-compose, Makefile) \
                  and launches the command most likely to start the project."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Clone a repository and run it",
        long_about = "Clones the repository (or reuses an existing local copy), detects how \
                      to run it and launches the chosen command in the checkout.\n\n\
                      Examples:\n  \
                      clonerun run https://github.com/acme/widget.git\n  \
                      clonerun run https://github.com/acme/widget.git --dir widget-dev\n  \
                      clonerun run https://github.com/acme/widget.git --yes"
    )]
    Run(RunArgs),

    #[command(
        about = "Show how a local checkout would be run",
        long_about = "Inspects an existing directory and prints the detected build systems, \
                      workflow files and run candidates without launching anything.\n\n\
                      Examples:\n  \
                      clonerun detect\n  \
                      clonerun detect /path/to/repo --format json"
    )]
    Detect(DetectArgs),

    #[command(about = "Print the effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[arg(value_name = "URL", help = "Remote repository URL")]
    pub url: String,

    #[arg(
        short = 'd',
        long = "dir",
        value_name = "NAME",
        help = "Local directory name (defaults to the repository name)"
    )]
    pub dir: Option<String>,

    #[arg(
        short = 'w',
        long,
        value_name = "PATH",
        help = "Directory to clone into (defaults to CLONERUN_WORKDIR or the current directory)"
    )]
    pub workdir: Option<PathBuf>,

    #[arg(short = 'y', long, help = "Run the first candidate without prompting")]
    pub yes: bool,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Seconds to wait after Ctrl-C before killing the command"
    )]
    pub grace_period: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
