//! Round-based event loop over the working set.
//!
//! Each round dispatches every operation under the active strategy, joins all
//! outcomes, retires the operations whose outcome is `true`, and refills the
//! working set back to its target size.

use std::time::{Duration, Instant};

use serde::Serialize;

use super::error::EngineError;
use super::executor::{build_executor, RoundExecutor};
use super::strategy::Strategy;
use crate::ops::{GeneratorConfig, Operation, OperationGenerator, SharedBuffer};
use crate::scheduler::{ThreadPoolConfig, DEFAULT_WORKER_THREADS};

/// Default working set size.
pub const DEFAULT_OPERATIONS: usize = 50;
/// Default number of rounds per run.
pub const DEFAULT_ITERATIONS: usize = 10;
/// Default shared buffer size (5 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 5 * 1024 * 1024;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub strategy: Strategy,
    /// Target working set size, restored after every round.
    pub operations: usize,
    /// Size of the shared payload buffer in bytes.
    pub buffer_size: usize,
    /// Worker threads for pooled scans (0 = auto-detect).
    pub worker_threads: usize,
    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub generator: GeneratorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            operations: DEFAULT_OPERATIONS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            worker_threads: DEFAULT_WORKER_THREADS,
            seed: None,
            generator: GeneratorConfig::default(),
        }
    }
}

/// Summary of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: usize,
    pub dispatched: usize,
    pub retired: usize,
    pub refilled: usize,
    pub elapsed_ms: u64,
}

/// Summary of a multi-round run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub strategy: Strategy,
    pub rounds: Vec<RoundReport>,
    pub total_retired: usize,
    pub elapsed_ms: u64,
}

/// Drives rounds of dispatch, join, retire and refill.
pub struct OperationEngine {
    config: EngineConfig,
    buffer: SharedBuffer,
    generator: OperationGenerator,
    working_set: Vec<Operation>,
    executor: Box<dyn RoundExecutor>,
    rounds_completed: usize,
}

impl OperationEngine {
    /// Build the shared buffer, the executor and the initial working set.
    ///
    /// Fails only if the executor cannot be built or the config is unusable.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        if config.buffer_size == 0 {
            return Err(EngineError::InvalidConfig("buffer_size must be > 0".into()));
        }

        let mut generator = match config.seed {
            Some(seed) => OperationGenerator::new(config.generator.clone(), seed),
            None => OperationGenerator::from_entropy(config.generator.clone()),
        };
        let buffer = SharedBuffer::random_uppercase(config.buffer_size, generator.rng_mut());
        let executor =
            build_executor(config.strategy, ThreadPoolConfig::with_threads(config.worker_threads))?;

        let mut engine = Self {
            working_set: Vec::with_capacity(config.operations),
            config,
            buffer,
            generator,
            executor,
            rounds_completed: 0,
        };
        engine.refill();

        tracing::info!(
            strategy = %engine.strategy(),
            operations = engine.config.operations,
            buffer_size = engine.config.buffer_size,
            "engine started"
        );
        Ok(engine)
    }

    pub fn strategy(&self) -> Strategy {
        self.executor.strategy()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    pub fn working_set(&self) -> &[Operation] {
        &self.working_set
    }

    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    /// Run `iterations` rounds.
    pub fn run(&mut self, iterations: usize) -> RunSummary {
        let start = Instant::now();
        let rounds: Vec<RoundReport> = (0..iterations).map(|_| self.run_round()).collect();
        RunSummary {
            strategy: self.strategy(),
            total_retired: rounds.iter().map(|r| r.retired).sum(),
            rounds,
            elapsed_ms: millis(start.elapsed()),
        }
    }

    /// Execute one full round.
    pub fn run_round(&mut self) -> RoundReport {
        let round = self.rounds_completed;
        let span = tracing::info_span!("round", round, strategy = %self.strategy());
        let _enter = span.enter();
        let start = Instant::now();

        let dispatched = self.working_set.len();
        let outcomes = self.executor.execute_round(&self.working_set, &self.buffer);
        let retired = retire_completed(&mut self.working_set, &outcomes);
        let refilled = self.refill();

        self.rounds_completed += 1;
        let report = RoundReport {
            round,
            dispatched,
            retired,
            refilled,
            elapsed_ms: millis(start.elapsed()),
        };
        tracing::info!(dispatched, retired, refilled, elapsed_ms = report.elapsed_ms, "round complete");
        report
    }

    /// Stop the executor's workers. No round can be in flight here.
    pub fn shutdown(self) {
        let Self { executor, rounds_completed, .. } = self;
        executor.shutdown();
        tracing::info!(rounds_completed, "engine stopped");
    }

    /// Append generated operations until the target size is reached.
    fn refill(&mut self) -> usize {
        let mut added = 0;
        while self.working_set.len() < self.config.operations {
            let operation = self.generator.next_operation(&self.buffer);
            tracing::debug!(kind = %operation.kind(), path = %operation.path().display(), "operation generated");
            self.working_set.push(operation);
            added += 1;
        }
        added
    }
}

/// Remove every operation whose outcome is `true`, keeping survivor order.
///
/// `outcomes[i]` belongs to `working_set[i]`. Returns the number removed.
pub fn retire_completed(working_set: &mut Vec<Operation>, outcomes: &[bool]) -> usize {
    debug_assert_eq!(working_set.len(), outcomes.len());
    let before = working_set.len();
    let mut flags = outcomes.iter();
    working_set.retain(|_| !flags.next().copied().unwrap_or(false));
    before - working_set.len()
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
