//! Per-item working record carried between passes

use std::fmt;

use converge_resilience::{ExecMetrics, ExecutionError, ExecutionResult, Worker};

/// `(input, last result, last integrated output)` for one item.
///
/// Once the result holds a value the record is final: later passes carry it
/// forward without touching the operation or the integration function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord<A, C, B> {
    input: A,
    result: ExecutionResult<C>,
    output: B,
}

impl<A, C, B> WorkRecord<A, C, B> {
    /// Run `operation` for `input` on `worker` and integrate the outcome
    pub fn compute<E, Op, Int>(worker: &mut Worker, input: A, operation: &Op, integrate: &Int) -> Self
    where
        E: fmt::Display,
        Op: Fn(&A) -> Result<C, E>,
        Int: Fn(&A, Result<&C, ExecutionError>) -> B,
    {
        let result = worker.run(|| operation(&input));
        let output = integrate(&input, result.as_outcome());
        Self {
            input,
            result,
            output,
        }
    }

    /// Re-run an unresolved record; a resolved record is returned unchanged
    #[must_use]
    pub fn recompute<E, Op, Int>(self, worker: &mut Worker, operation: &Op, integrate: &Int) -> Self
    where
        E: fmt::Display,
        Op: Fn(&A) -> Result<C, E>,
        Int: Fn(&A, Result<&C, ExecutionError>) -> B,
    {
        if self.is_resolved() {
            return self;
        }
        Self::compute(worker, self.input, operation, integrate)
    }

    /// Replace an unresolved result with a recovered value
    #[must_use]
    pub fn recover<Int>(self, value: C, integrate: &Int) -> Self
    where
        Int: Fn(&A, Result<&C, ExecutionError>) -> B,
    {
        let output = integrate(&self.input, Ok(&value));
        Self {
            input: self.input,
            result: ExecutionResult::Success(value),
            output,
        }
    }

    /// The input item
    pub const fn input(&self) -> &A {
        &self.input
    }

    /// The most recent executor result
    pub const fn result(&self) -> &ExecutionResult<C> {
        &self.result
    }

    /// The most recently integrated output
    pub const fn output(&self) -> &B {
        &self.output
    }

    /// Drop everything but the output
    pub fn into_output(self) -> B {
        self.output
    }

    /// `true` once the result holds a value
    pub const fn is_resolved(&self) -> bool {
        self.result.is_success()
    }

    /// This record's contribution to the pass metrics
    pub fn metrics(&self) -> ExecMetrics {
        ExecMetrics::from_result(&self.result)
    }
}
