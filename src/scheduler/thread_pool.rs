//! Fixed-size worker pool draining a shared FIFO task queue.
//!
//! Workers sleep on a condition variable while the queue is empty and never
//! run a task while holding the queue lock. Shutdown is graceful: every task
//! enqueued before the stop flag flips is executed before the workers exit.
//!
//! A task must not enqueue another task on the same pool and then wait for
//! it synchronously. With a bounded number of workers that can deadlock.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

use super::pool::ThreadPoolConfig;

/// A unit of work executed by the pool.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Statistics for thread pool activity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ThreadPoolStats {
    pub tasks_executed: u64,
    pub tasks_panicked: u64,
    pub queued: usize,
    pub threads: usize,
}

/// Queue contents and the stop flag, guarded by one lock.
struct QueueState {
    tasks: VecDeque<Task>,
    shutdown: bool,
}

/// State shared between the pool handle and its workers.
struct Shared {
    state: Mutex<QueueState>,
    available: Condvar,
    executed: AtomicU64,
    panicked: AtomicU64,
}

/// Fixed-size pool of worker threads.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    config: ThreadPoolConfig,
}

impl WorkerPool {
    /// Spawn the configured number of workers.
    pub fn new(config: ThreadPoolConfig) -> Result<Self, ThreadPoolError> {
        let num_threads = config.resolved_threads();
        if num_threads == 0 {
            return Err(ThreadPoolError::NoWorkers);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
            executed: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(num_threads),
            config,
        };

        for id in 0..num_threads {
            let shared = Arc::clone(&pool.shared);
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", pool.config.thread_name_prefix, id));
            if pool.config.stack_size > 0 {
                builder = builder.stack_size(pool.config.stack_size);
            }

            match builder.spawn(move || worker_loop(id, &shared)) {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    // Dropping the partial pool joins whatever was spawned.
                    return Err(ThreadPoolError::ThreadSpawnFailed(e.to_string()));
                }
            }
        }

        tracing::debug!(threads = num_threads, prefix = %pool.config.thread_name_prefix, "worker pool started");
        Ok(pool)
    }

    /// Queue a task. Never waits for the task to run.
    pub fn enqueue<F>(&self, task: F) -> Result<(), ThreadPoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(task))
    }

    /// Queue an already boxed task.
    pub fn submit(&self, task: Task) -> Result<(), ThreadPoolError> {
        {
            let mut state = self.shared.state.lock();
            if state.shutdown {
                return Err(ThreadPoolError::PoolShutdown);
            }
            state.tasks.push_back(task);
        }
        self.shared.available.notify_one();
        Ok(())
    }

    /// Get current statistics.
    pub fn stats(&self) -> ThreadPoolStats {
        ThreadPoolStats {
            tasks_executed: self.shared.executed.load(Ordering::Acquire),
            tasks_panicked: self.shared.panicked.load(Ordering::Acquire),
            queued: self.shared.state.lock().tasks.len(),
            threads: self.workers.len(),
        }
    }

    /// Get number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Check if pool is shutting down.
    pub fn is_shutdown(&self) -> bool {
        self.shared.state.lock().shutdown
    }

    /// Stop accepting tasks (does not wait for threads).
    pub fn signal_shutdown(&self) {
        self.shared.state.lock().shutdown = true;
        self.shared.available.notify_all();
    }

    /// Drain queued tasks, then join every worker.
    pub fn shutdown(mut self) {
        self.join_workers();
    }

    fn join_workers(&mut self) {
        self.signal_shutdown();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("worker thread terminated abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.join_workers();
        }
    }
}

/// Worker thread main loop.
fn worker_loop(worker_id: usize, shared: &Shared) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            while state.tasks.is_empty() && !state.shutdown {
                shared.available.wait(&mut state);
            }
            match state.tasks.pop_front() {
                Some(task) => task,
                // Empty queue with the stop flag set.
                None => break,
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            shared.panicked.fetch_add(1, Ordering::AcqRel);
            tracing::error!(worker_id, "task panicked");
        }
        shared.executed.fetch_add(1, Ordering::AcqRel);
    }
    tracing::trace!(worker_id, "worker exiting");
}

/// Errors for thread pool operations.
#[derive(Debug, Error)]
pub enum ThreadPoolError {
    #[error("Thread pool is shut down")]
    PoolShutdown,

    #[error("Thread pool has no workers")]
    NoWorkers,

    #[error("Failed to spawn thread: {0}")]
    ThreadSpawnFailed(String),
}
