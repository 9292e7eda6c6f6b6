//! Utility modules for clonerun
//!
//! - Structured logging setup and configuration

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
