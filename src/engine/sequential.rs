//! Fully synchronous execution: one operation at a time on the engine thread.

use super::executor::{append_range, write_range_chunked, RoundExecutor};
use super::strategy::Strategy;
use crate::ops::{fileio, Operation, SharedBuffer};

/// Runs every operation to completion before starting the next.
#[derive(Debug, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute one operation and return its retire-eligibility.
    pub fn dispatch(&self, operation: &Operation, buffer: &SharedBuffer) -> bool {
        match operation {
            Operation::Read { path } => fileio::is_valid_digit_count(fileio::count_digits(path)),
            Operation::Write { path, data } => append_range(path, buffer, *data),
            Operation::WriteChunked { path, data, chunks } => {
                write_range_chunked(path, buffer, *data, *chunks)
            }
        }
    }
}

impl RoundExecutor for SequentialExecutor {
    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }

    fn execute_round(&self, operations: &[Operation], buffer: &SharedBuffer) -> Vec<bool> {
        operations
            .iter()
            .map(|operation| self.dispatch(operation, buffer))
            .collect()
    }
}
