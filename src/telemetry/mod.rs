//! Telemetry module.
//!
//! Provides structured logging setup. All output goes to stderr or a file.

mod logging;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
