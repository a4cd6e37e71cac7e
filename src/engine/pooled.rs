//! Worker-pool execution with deferred read outcomes.
//!
//! Reads are scanned on pool threads. Writes run synchronously on the engine
//! thread. The join phase demands every deferred outcome in dispatch order,
//! which blocks the engine thread until the slowest scan has finished.

use std::path::Path;

use super::error::EngineError;
use super::executor::{append_range, write_range_chunked, RoundExecutor};
use super::outcome::Outcome;
use super::strategy::Strategy;
use crate::ops::{fileio, Operation, SharedBuffer};
use crate::scheduler::{deferred, Deferred, Pending, ThreadPoolConfig, WorkerPool};

/// Executes reads on a [`WorkerPool`] behind [`Deferred`] results.
pub struct PooledExecutor {
    pool: WorkerPool,
}

impl PooledExecutor {
    pub fn new(config: ThreadPoolConfig) -> Result<Self, EngineError> {
        Ok(Self {
            pool: WorkerPool::new(config)?,
        })
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Start one operation. Reads return before the scan has run.
    pub fn dispatch(&self, operation: &Operation, buffer: &SharedBuffer) -> Outcome {
        match operation {
            Operation::Read { path } => Outcome::Deferred(self.read_has_valid_digit_count(path)),
            Operation::Write { path, data } => Outcome::Immediate(append_range(path, buffer, *data)),
            Operation::WriteChunked { path, data, chunks } => {
                Outcome::Immediate(write_range_chunked(path, buffer, *data, *chunks))
            }
        }
    }

    fn read_has_valid_digit_count(&self, path: &Path) -> Deferred<bool> {
        Deferred::new(self.count_digits_async(path), fileio::is_valid_digit_count)
    }

    /// Submit the scan of `path`. A missing file submits nothing.
    fn count_digits_async(&self, path: &Path) -> Pending<usize> {
        let Some(file) = fileio::open_for_scan(path) else {
            return Pending::ready(0);
        };

        let (promise, pending) = deferred::channel();
        if let Err(e) = self
            .pool
            .enqueue(move || promise.fulfill(fileio::count_digits_in(file)))
        {
            // The rejected task dropped its promise; the outcome resolves as abandoned.
            tracing::warn!(path = %path.display(), error = %e, "scan not submitted");
        }
        pending
    }
}

impl RoundExecutor for PooledExecutor {
    fn strategy(&self) -> Strategy {
        Strategy::Pooled
    }

    fn execute_round(&self, operations: &[Operation], buffer: &SharedBuffer) -> Vec<bool> {
        let outcomes: Vec<Outcome> = operations
            .iter()
            .map(|operation| self.dispatch(operation, buffer))
            .collect();

        outcomes.into_iter().map(Outcome::resolve).collect()
    }

    fn shutdown(self: Box<Self>) {
        self.pool.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_missing_read_submits_no_task() {
        let dir = tempfile::tempdir().unwrap();
        let executor = PooledExecutor::new(ThreadPoolConfig::with_threads(1)).unwrap();
        let buffer = SharedBuffer::from_bytes(vec![b'A'; 8]);
        let op = Operation::Read { path: dir.path().join("file_0.txt") };

        assert!(executor.dispatch(&op, &buffer).resolve());
        assert_eq!(executor.pool().stats().tasks_executed, 0);
    }

    #[test]
    fn test_read_runs_on_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("file_1.txt");
        fs::write(&path, b"123").unwrap();

        let executor = PooledExecutor::new(ThreadPoolConfig::with_threads(2)).unwrap();
        let buffer = SharedBuffer::from_bytes(vec![b'A'; 8]);
        let outcome = executor.dispatch(&Operation::Read { path }, &buffer);

        assert!(matches!(outcome, Outcome::Deferred(_)));
        assert!(!outcome.resolve());
        Box::new(executor).shutdown();
    }

    #[test]
    fn test_read_after_shutdown_signal_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_2.txt");
        fs::write(&path, b"0123456789").unwrap();

        let executor = PooledExecutor::new(ThreadPoolConfig::with_threads(1)).unwrap();
        executor.pool().signal_shutdown();
        let buffer = SharedBuffer::from_bytes(vec![b'A'; 8]);

        assert!(!executor.dispatch(&Operation::Read { path }, &buffer).resolve());
    }
}
