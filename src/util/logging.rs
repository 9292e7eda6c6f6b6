//! Structured logging setup for clonerun
//!
//! Initializes a `tracing` subscriber that writes to stderr, keeping stdout free for
//! the candidate listing and for the launched project's own output.
//!
//! # Example
//!
//! ```no_run
//! use clonerun::util::logging::{init_logging, LoggingConfig};
//! use tracing::{info, warn, Level};
//!
//! init_logging(LoggingConfig::from_env().with_level_override(Some(Level::DEBUG)));
//!
//! info!(repo = "widget", "Cloning repository");
//! warn!(file = "ci.yml", "Workflow file could not be read");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

const LOG_LEVEL_VAR: &str = "CLONERUN_LOG_LEVEL";
const LOG_JSON_VAR: &str = "CLONERUN_LOG_JSON";

/// Configuration for logging initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., clonerun::resolve) in logs
    pub include_target: bool,
}

impl LoggingConfig {
    /// Reads `CLONERUN_LOG_LEVEL` (default `info`) and `CLONERUN_LOG_JSON` (default `false`)
    pub fn from_env() -> Self {
        let level = env::var(LOG_LEVEL_VAR)
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);

        let use_json = env::var(LOG_JSON_VAR)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            include_target: true,
        }
    }

    /// Replaces the level when a command-line flag asked for one
    pub fn with_level_override(mut self, level: Option<Level>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        self
    }
}

/// Parses a log level from a string
///
/// Case-insensitive; unknown values fall back to `Level::INFO`.
///
/// ```
/// use clonerun::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Builds the filter: `RUST_LOG` wins when set, otherwise `clonerun=<level>`
fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let mut filter = EnvFilter::new("warn");
    if let Ok(directive) = format!("clonerun={}", level).parse() {
        filter = filter.add_directive(directive);
    }
    filter
}

/// Initializes the logging system with the provided configuration
///
/// Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);
        let registry = tracing_subscriber::registry().with(filter);

        if config.use_json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target),
                )
                .init();
        }
    });
}
