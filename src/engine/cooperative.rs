//! Cooperative execution on a single-threaded scheduler.
//!
//! Every dispatched operation becomes a future polled on one current-thread
//! runtime. A read suspends twice: once after handing its scan to the
//! auxiliary pool, and once more until the scan result arrives back on the
//! scheduling thread. The round's futures are gathered with `join_all`, which
//! keeps the outcomes in dispatch order.

use std::path::Path;

use futures::future::join_all;
use tokio::runtime::{Builder, Runtime};

use super::error::EngineError;
use super::executor::{append_range, write_range_chunked, RoundExecutor};
use super::strategy::Strategy;
use crate::ops::{fileio, Operation, SharedBuffer};
use crate::scheduler::{deferred, ThreadPoolConfig, WorkerPool};

/// Multiplexes a round's operations over one scheduling thread.
pub struct CooperativeExecutor {
    runtime: Runtime,
    auxiliary: WorkerPool,
}

impl CooperativeExecutor {
    pub fn new(auxiliary: ThreadPoolConfig) -> Result<Self, EngineError> {
        let runtime = Builder::new_current_thread()
            .thread_name("op-scheduler")
            .build()
            .map_err(EngineError::Runtime)?;
        Ok(Self {
            runtime,
            auxiliary: WorkerPool::new(auxiliary)?,
        })
    }

    pub fn auxiliary_pool(&self) -> &WorkerPool {
        &self.auxiliary
    }

    /// Run one operation to completion as a future.
    pub async fn dispatch(&self, operation: &Operation, buffer: &SharedBuffer) -> bool {
        match operation {
            Operation::Read { path } => self.read_has_valid_digit_count(path).await,
            Operation::Write { path, data } => append_range(path, buffer, *data),
            Operation::WriteChunked { path, data, chunks } => {
                write_range_chunked(path, buffer, *data, *chunks)
            }
        }
    }

    async fn read_has_valid_digit_count(&self, path: &Path) -> bool {
        let Some(file) = fileio::open_for_scan(path) else {
            return fileio::is_valid_digit_count(0);
        };

        let (promise, pending) = deferred::channel();
        if let Err(e) = self
            .auxiliary
            .enqueue(move || promise.fulfill(fileio::count_digits_in(file)))
        {
            tracing::warn!(path = %path.display(), error = %e, "scan not submitted");
            return false;
        }
        // Let sibling dispatches hand off their scans.
        tokio::task::yield_now().await;

        match pending.recv().await {
            Ok(count) => fileio::is_valid_digit_count(count),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "scan result lost");
                false
            }
        }
    }

    /// Dispatch every operation and suspend until all have finished.
    pub async fn join_round(&self, operations: &[Operation], buffer: &SharedBuffer) -> Vec<bool> {
        join_all(
            operations
                .iter()
                .map(|operation| self.dispatch(operation, buffer)),
        )
        .await
    }
}

impl RoundExecutor for CooperativeExecutor {
    fn strategy(&self) -> Strategy {
        Strategy::Cooperative
    }

    fn execute_round(&self, operations: &[Operation], buffer: &SharedBuffer) -> Vec<bool> {
        self.runtime.block_on(self.join_round(operations, buffer))
    }

    fn shutdown(self: Box<Self>) {
        let Self { runtime, auxiliary } = *self;
        auxiliary.shutdown();
        drop(runtime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, Instant};

    /// The executed counter is bumped after the task body, so poll briefly.
    fn wait_for_executed(pool: &WorkerPool, expected: u64) -> u64 {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let executed = pool.stats().tasks_executed;
            if executed >= expected || Instant::now() >= deadline {
                return executed;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_reads_join_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let ten = dir.path().join("file_0.txt");
        let three = dir.path().join("file_1.txt");
        fs::write(&ten, b"0123456789").unwrap();
        fs::write(&three, b"a1b2c3").unwrap();

        let executor = CooperativeExecutor::new(ThreadPoolConfig::auxiliary(2)).unwrap();
        let buffer = SharedBuffer::from_bytes(vec![b'A'; 8]);
        let ops = vec![
            Operation::Read { path: three.clone() },
            Operation::Read { path: ten },
            Operation::Read { path: dir.path().join("missing.txt") },
            Operation::Read { path: three },
        ];

        assert_eq!(executor.execute_round(&ops, &buffer), vec![false, true, true, false]);
        Box::new(executor).shutdown();
    }

    #[test]
    fn test_empty_round() {
        let executor = CooperativeExecutor::new(ThreadPoolConfig::auxiliary(1)).unwrap();
        let buffer = SharedBuffer::from_bytes(vec![b'A'; 8]);
        assert!(executor.execute_round(&[], &buffer).is_empty());
    }

    #[test]
    fn test_missing_read_submits_no_task() {
        let dir = tempfile::tempdir().unwrap();
        let executor = CooperativeExecutor::new(ThreadPoolConfig::auxiliary(1)).unwrap();
        let buffer = SharedBuffer::from_bytes(vec![b'A'; 8]);
        let ops = vec![Operation::Read { path: dir.path().join("file_0.txt") }];

        assert_eq!(executor.execute_round(&ops, &buffer), vec![true]);
        let stats = executor.auxiliary_pool().stats();
        assert_eq!(stats.tasks_executed, 0);
        assert_eq!(stats.queued, 0);
    }

    #[test]
    fn test_read_runs_on_auxiliary_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_1.txt");
        fs::write(&path, b"123").unwrap();

        let executor = CooperativeExecutor::new(ThreadPoolConfig::auxiliary(2)).unwrap();
        let buffer = SharedBuffer::from_bytes(vec![b'A'; 8]);
        let ops = vec![
            Operation::Read { path },
            Operation::Read { path: dir.path().join("file_2.txt") },
        ];

        assert_eq!(executor.execute_round(&ops, &buffer), vec![false, true]);
        assert_eq!(wait_for_executed(executor.auxiliary_pool(), 1), 1);
        Box::new(executor).shutdown();
    }
}
