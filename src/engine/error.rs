//! Engine error types.
//!
//! Only construction can fail. Per-operation failures never surface here;
//! they are folded into the operation's outcome.

use thiserror::Error;

use crate::scheduler::ThreadPoolError;

/// Errors that prevent an engine or executor from being built.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Worker pool unavailable: {0}")]
    Pool(#[from] ThreadPoolError),

    #[error("Failed to build scheduler runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}
