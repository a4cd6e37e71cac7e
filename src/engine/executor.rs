//! The seam between the round loop and the execution strategies.

use std::num::NonZeroUsize;
use std::path::Path;

use super::cooperative::CooperativeExecutor;
use super::error::EngineError;
use super::pooled::PooledExecutor;
use super::sequential::SequentialExecutor;
use super::strategy::Strategy;
use crate::ops::{fileio, ByteRange, Operation, SharedBuffer};
use crate::scheduler::ThreadPoolConfig;

/// Dispatches a round of operations and joins their outcomes.
pub trait RoundExecutor: Send {
    fn strategy(&self) -> Strategy;

    /// Dispatch every operation, then wait for all of them.
    ///
    /// Returns one retire-eligibility flag per operation, in input order.
    fn execute_round(&self, operations: &[Operation], buffer: &SharedBuffer) -> Vec<bool>;

    /// Release worker threads. Called once, after the last round.
    fn shutdown(self: Box<Self>) {}
}

/// Build the executor for `strategy`.
pub fn build_executor(
    strategy: Strategy,
    pool: ThreadPoolConfig,
) -> Result<Box<dyn RoundExecutor>, EngineError> {
    let executor: Box<dyn RoundExecutor> = match strategy {
        Strategy::Sequential => Box::new(SequentialExecutor::new()),
        Strategy::Pooled => Box::new(PooledExecutor::new(pool)?),
        Strategy::Cooperative => {
            Box::new(CooperativeExecutor::new(ThreadPoolConfig::auxiliary(pool.num_threads))?)
        }
    };
    Ok(executor)
}

/// Append a range of the shared buffer to `path`.
pub(crate) fn append_range(path: &Path, buffer: &SharedBuffer, range: ByteRange) -> bool {
    match buffer.slice(range) {
        Some(data) => fileio::write_to_file(path, data, None),
        None => {
            tracing::warn!(path = %path.display(), ?range, "write range outside shared buffer");
            false
        }
    }
}

/// Write a range of the shared buffer to `path` as positional chunks.
pub(crate) fn write_range_chunked(
    path: &Path,
    buffer: &SharedBuffer,
    range: ByteRange,
    chunks: NonZeroUsize,
) -> bool {
    match buffer.slice(range) {
        Some(data) => fileio::write_in_chunks(path, data, chunks),
        None => {
            tracing::warn!(path = %path.display(), ?range, "chunked range outside shared buffer");
            false
        }
    }
}
