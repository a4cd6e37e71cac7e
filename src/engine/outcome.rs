//! Per-operation outcomes, known now or later.

use crate::scheduler::Deferred;

/// Retire-eligibility of one dispatched operation.
#[derive(Debug)]
pub enum Outcome {
    /// Resolved during dispatch.
    Immediate(bool),
    /// Resolved when the engine demands it at the join phase.
    Deferred(Deferred<bool>),
}

impl Outcome {
    /// Block until the outcome is known.
    ///
    /// An abandoned deferred result keeps the operation in the working set.
    pub fn resolve(self) -> bool {
        match self {
            Self::Immediate(value) => value,
            Self::Deferred(deferred) => match deferred.get() {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(error = %e, "deferred outcome lost, keeping operation");
                    false
                }
            },
        }
    }
}
