//! Multi-pass convergence driver
//!
//! Pass 0 runs every item once. Each later pass re-runs only the items still
//! without a value, until every item resolves or the pass budget is spent.
//! Items keep their partition, and each partition keeps its own [`Worker`],
//! for the whole run; a worker whose circuit opened in pass 0 still skips in
//! pass 3.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use converge_resilience::{
    ExecMetrics, ExecutionError, Executor, ExecutorConfigBuilder, Worker, WorkerStats,
};

use crate::config::{DriverConfig, RecoveryMode, RetryEligibility};
use crate::dataset::Dataset;
use crate::error::DriverResult;
use crate::record::WorkRecord;

/// Fallback producing a value for an item that never resolved.
pub type Recover<'a, A, C> = dyn Fn(&A) -> Option<C> + Sync + 'a;

/// Checkpoint hooks around each materialized pass.
///
/// The driver always materializes a pass before reading it, so these are
/// notifications (for persisting or accounting), not correctness
/// requirements. The default methods do nothing.
pub trait Checkpoint: Send + Sync {
    /// Pass `pass` has been materialized with `records` records
    fn persist(&self, pass: usize, records: usize) {
        let _ = (pass, records);
    }

    /// Pass `pass` has been superseded and may be dropped
    fn release(&self, pass: usize) {
        let _ = pass;
    }
}

/// Checkpoint hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {}

/// Metrics observed after one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Pass index, 0 for the initial sweep
    pub pass: usize,
    /// Aggregated metrics over all records after this pass
    pub metrics: ExecMetrics,
}

/// Outputs plus what it took to produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvergenceReport<B> {
    /// One output per input item, in input order
    pub outputs: Vec<B>,
    /// Metrics after each pass that ran
    pub passes: Vec<PassReport>,
    /// Records resolved by the recovery function after the last pass
    pub recovered: u64,
    /// Final counters of each partition's worker
    pub workers: Vec<WorkerStats>,
}

impl<B> ConvergenceReport<B> {
    /// Metrics after the last pass (before recovery)
    #[must_use]
    pub fn final_metrics(&self) -> ExecMetrics {
        self.passes
            .last()
            .map_or(ExecMetrics::ZERO, |report| report.metrics)
    }

    /// `true` if every item resolved through the operation
    #[must_use]
    pub fn converged(&self) -> bool {
        self.final_metrics().is_pure_success()
    }

    /// Passes run after pass 0
    #[must_use]
    pub fn extra_passes(&self) -> usize {
        self.passes.len().saturating_sub(1)
    }

    /// Invocations of the operation across all workers
    #[must_use]
    pub fn invocations(&self) -> u64 {
        self.workers.iter().map(|stats| stats.invocations).sum()
    }
}

/// Drives an operation over a dataset until it converges or runs out of passes.
#[derive(Clone)]
pub struct ConvergenceDriver {
    executor: Executor,
    config: DriverConfig,
    checkpoint: Arc<dyn Checkpoint>,
}

impl fmt::Debug for ConvergenceDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvergenceDriver")
            .field("executor", &self.executor.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConvergenceDriver {
    /// Driver allowing `max_passes` passes after pass 0
    #[must_use]
    pub fn new(executor: Executor, max_passes: usize) -> Self {
        Self {
            executor,
            config: DriverConfig::with_max_passes(max_passes),
            checkpoint: Arc::new(NoCheckpoint),
        }
    }

    /// Driver from a full configuration
    pub fn from_config(executor: Executor, config: DriverConfig) -> DriverResult<Self> {
        config.validate()?;
        Ok(Self {
            executor,
            config,
            checkpoint: Arc::new(NoCheckpoint),
        })
    }

    /// Build the executor configuration and the driver in one step.
    ///
    /// A rejected executor configuration surfaces as [`DriverError::Executor`](crate::DriverError::Executor).
    pub fn build(executor: ExecutorConfigBuilder, config: DriverConfig) -> DriverResult<Self> {
        let executor = Executor::new(executor.build()?);
        Self::from_config(executor, config)
    }

    /// Install checkpoint hooks
    #[must_use = "builder methods must be chained or built"]
    pub fn with_checkpoint(mut self, checkpoint: impl Checkpoint + 'static) -> Self {
        self.checkpoint = Arc::new(checkpoint);
        self
    }

    /// Driver configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run to convergence and return one output per item, in input order
    pub fn run<A, C, B, E, Op, Int>(
        &self,
        items: Vec<A>,
        operation: Op,
        integrate: Int,
        recover: Option<&Recover<'_, A, C>>,
    ) -> Vec<B>
    where
        A: Send + Sync,
        C: Send + Sync,
        B: Send + Sync,
        E: fmt::Display,
        Op: Fn(&A) -> Result<C, E> + Sync,
        Int: Fn(&A, Result<&C, ExecutionError>) -> B + Sync,
    {
        self.run_with_report(items, operation, integrate, recover)
            .outputs
    }

    /// Like [`run`](Self::run), also returning per-pass metrics
    #[tracing::instrument(skip_all, fields(
        executor = %self.executor.name(),
        items = items.len(),
        max_passes = self.config.max_passes,
    ))]
    pub fn run_with_report<A, C, B, E, Op, Int>(
        &self,
        items: Vec<A>,
        operation: Op,
        integrate: Int,
        recover: Option<&Recover<'_, A, C>>,
    ) -> ConvergenceReport<B>
    where
        A: Send + Sync,
        C: Send + Sync,
        B: Send + Sync,
        E: fmt::Display,
        Op: Fn(&A) -> Result<C, E> + Sync,
        Int: Fn(&A, Result<&C, ExecutionError>) -> B + Sync,
    {
        let partitions = self.config.partitions_for(items.len());
        let mut workers: Vec<Worker> = (0..partitions).map(|_| self.executor.worker()).collect();

        let mut pass = 0;
        let mut data = Dataset::from_vec(items, partitions)
            .map_partitions_with(&mut workers, |worker, input| {
                WorkRecord::compute(worker, input, &operation, &integrate)
            });
        self.persist(pass, &data);

        let mut remaining = self.config.max_passes;
        let mut passes = Vec::new();
        loop {
            let metrics = data.aggregate(
                ExecMetrics::ZERO,
                |acc, record| acc + record.metrics(),
                ExecMetrics::combine,
            );
            info!(
                pass,
                success = metrics.success,
                skipped = metrics.skipped,
                failed = metrics.failed,
                attempts = metrics.total_attempts,
                "Pass complete"
            );
            passes.push(PassReport { pass, metrics });

            if remaining == 0 || self.eligible(&metrics) == 0 {
                break;
            }

            let eligibility = self.config.eligibility;
            let next = data.map_partitions_with(&mut workers, |worker, record| {
                if eligibility.should_retry(record.result()) {
                    record.recompute(worker, &operation, &integrate)
                } else {
                    record
                }
            });

            self.release(pass);
            pass += 1;
            data = next;
            self.persist(pass, &data);
            remaining -= 1;
        }

        let (data, recovered) = self.apply_recovery(data, recover, &integrate);

        ConvergenceReport {
            outputs: data.into_vec().into_iter().map(WorkRecord::into_output).collect(),
            passes,
            recovered,
            workers: workers.iter().map(Worker::stats).collect(),
        }
    }

    /// Records a further pass would re-run, given this pass's metrics
    fn eligible(&self, metrics: &ExecMetrics) -> u64 {
        match self.config.eligibility {
            RetryEligibility::Unresolved => metrics.unresolved(),
            RetryEligibility::FailedOnly => metrics.failed,
        }
    }

    fn apply_recovery<A, C, B, Int>(
        &self,
        data: Dataset<WorkRecord<A, C, B>>,
        recover: Option<&Recover<'_, A, C>>,
        integrate: &Int,
    ) -> (Dataset<WorkRecord<A, C, B>>, u64)
    where
        A: Send + Sync,
        C: Send + Sync,
        B: Send + Sync,
        Int: Fn(&A, Result<&C, ExecutionError>) -> B + Sync,
    {
        let Some(recover) = recover else {
            return (data, 0);
        };
        if self.config.recovery == RecoveryMode::Ignore {
            debug!("Recovery function supplied but recovery mode is `ignore`");
            return (data, 0);
        }

        let unresolved = |data: &Dataset<WorkRecord<A, C, B>>| {
            data.aggregate(
                0_u64,
                |acc, record| acc + u64::from(!record.is_resolved()),
                |a, b| a + b,
            )
        };

        let before = unresolved(&data);
        let data = data.map(|record| {
            if record.is_resolved() {
                return record;
            }
            match recover(record.input()) {
                Some(value) => record.recover(value, integrate),
                None => record,
            }
        });
        let recovered = before - unresolved(&data);
        if recovered > 0 {
            info!(recovered, "Recovered unresolved records");
        }
        (data, recovered)
    }

    fn persist<T: Send>(&self, pass: usize, data: &Dataset<T>) {
        debug!(pass, records = data.len(), "Checkpointing pass");
        self.checkpoint.persist(pass, data.len());
    }

    fn release(&self, pass: usize) {
        debug!(pass, "Releasing checkpoint");
        self.checkpoint.release(pass);
    }
}

/// Run `operation` over `items` with up to `max_passes` extra passes.
///
/// Convenience over [`ConvergenceDriver::run`] with default partitioning and
/// policies. Returns one output per item, in input order.
pub fn run_convergence<A, C, B, E, Op, Int>(
    items: Vec<A>,
    operation: Op,
    integrate: Int,
    max_passes: usize,
    executor: &Executor,
    recover: Option<&Recover<'_, A, C>>,
) -> Vec<B>
where
    A: Send + Sync,
    C: Send + Sync,
    B: Send + Sync,
    E: fmt::Display,
    Op: Fn(&A) -> Result<C, E> + Sync,
    Int: Fn(&A, Result<&C, ExecutionError>) -> B + Sync,
{
    ConvergenceDriver::new(executor.clone(), max_passes).run(items, operation, integrate, recover)
}
