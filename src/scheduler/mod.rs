//! Scheduling primitives for the operation engine.
//!
//! Provides the fixed-size worker pool, its configuration, and the two-stage
//! deferred results used to hand scan outcomes back to the engine.

pub mod deferred;
mod pool;
mod thread_pool;

pub use deferred::{Deferred, DeferredError, Pending, Promise};
pub use pool::{ThreadPoolConfig, DEFAULT_WORKER_THREADS};
pub use thread_pool::{Task, ThreadPoolError, ThreadPoolStats, WorkerPool};
