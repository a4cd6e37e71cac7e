//! Operation engine module.
//!
//! Runs the round loop over the working set and provides the three
//! interchangeable execution strategies behind the `RoundExecutor` trait.

mod cooperative;
mod error;
mod event_loop;
mod executor;
mod outcome;
mod pooled;
mod sequential;
mod strategy;

pub use cooperative::CooperativeExecutor;
pub use error::EngineError;
pub use event_loop::{
    retire_completed, EngineConfig, OperationEngine, RoundReport, RunSummary,
    DEFAULT_BUFFER_SIZE, DEFAULT_ITERATIONS, DEFAULT_OPERATIONS,
};
pub use executor::{build_executor, RoundExecutor};
pub use outcome::Outcome;
pub use pooled::PooledExecutor;
pub use sequential::SequentialExecutor;
pub use strategy::{ParseStrategyError, Strategy};
