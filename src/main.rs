use clonerun::cli::commands::{CliArgs, Commands};
use clonerun::cli::handlers::{handle_config, handle_detect, handle_run};
use clonerun::util::logging::{init_logging, parse_level, LoggingConfig};
use clonerun::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_env().with_level_override(level_from_flags(&args)));

    debug!("clonerun v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Run(run_args) => handle_run(run_args).await,
        Commands::Detect(detect_args) => handle_detect(detect_args).await,
        Commands::Config(config_args) => handle_config(config_args).await,
    };

    std::process::exit(exit_code);
}

/// `--log-level` wins over `-v`/`-q`; `None` defers to the environment
fn level_from_flags(args: &CliArgs) -> Option<Level> {
    if let Some(level_str) = &args.log_level {
        Some(parse_level(level_str))
    } else if args.verbose {
        Some(Level::DEBUG)
    } else if args.quiet {
        Some(Level::ERROR)
    } else {
        None
    }
}
