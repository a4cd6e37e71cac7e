//! op-engine
//!
//! A round-based engine that keeps a fixed-size working set of file
//! operations in flight and runs each round under one of three
//! interchangeable execution strategies.
//!
//! # Operations
//!
//! - **Read**: scan a file and count ASCII digits; done when the count is a
//!   multiple of ten.
//! - **Write**: append a range of the shared buffer, or write it at an offset.
//! - **WriteChunked**: write a range as consecutive pieces at increasing offsets.
//!
//! # Strategies
//!
//! - **Sequential**: everything runs to completion on the engine thread.
//! - **Pooled**: scans run on a fixed worker pool behind deferred results.
//! - **Cooperative**: reads suspend on a single-threaded scheduler while an
//!   auxiliary pool scans.
//!
//! Every round dispatches the whole working set, joins all outcomes, retires
//! completed operations and refills back to the target size.

pub mod cli;
pub mod config;
pub mod engine;
pub mod ops;
pub mod scheduler;
pub mod telemetry;

pub use config::{ConfigError, EffectiveConfig, EnvConfig};
pub use engine::{
    EngineConfig, EngineError, OperationEngine, RoundExecutor, RoundReport, RunSummary, Strategy,
};
pub use ops::{Operation, OperationGenerator, SharedBuffer};
pub use scheduler::{ThreadPoolConfig, WorkerPool};
