//! Integration tests for the retry executor

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use converge_resilience::prelude::*;
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Configuration -> executor
// ---------------------------------------------------------------------------

#[test]
fn executor_from_json_config() {
    let config: ExecutorConfig = serde_json::from_str(
        r#"{"name":"geocoder","attempt":2,"breakAfterNFailure":2}"#,
    )
    .unwrap();
    let executor = Executor::try_new(config).unwrap();
    let mut worker = executor.worker();

    for _ in 0..2 {
        let result: ExecutionResult<()> = worker.run(|| Err("timeout"));
        assert_eq!(result.info().map(ExecutionInfo::nb_attempt), Some(2));
    }
    assert_eq!(worker.circuit_state(), CircuitState::Open);
    assert!(worker.run(|| Ok::<_, &str>(())).is_skipped());
}

#[test]
fn attempt_zero_behaves_like_one() {
    let executor = Executor::new(ExecutorConfig::builder("zero").attempt(0).build().unwrap());
    let mut worker = executor.worker();
    let mut invocations = 0;

    let _: ExecutionResult<()> = worker.run(|| {
        invocations += 1;
        Err("down")
    });

    assert_eq!(invocations, 1);
}

// ---------------------------------------------------------------------------
// Concurrency: one worker per thread
// ---------------------------------------------------------------------------

#[test]
fn tripped_worker_does_not_affect_other_threads() {
    let executor = Executor::new(
        ExecutorConfig::builder("shared")
            .break_after_n_failure(1)
            .build()
            .unwrap(),
    );
    let invocations = AtomicU32::new(0);

    let outcomes: Vec<WorkerStats> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|id| {
                let executor = executor.clone();
                let invocations = &invocations;
                scope.spawn(move || {
                    let mut worker = executor.worker();
                    for _ in 0..5 {
                        let _ = worker.run(|| {
                            invocations.fetch_add(1, Ordering::SeqCst);
                            if id == 0 { Err("down") } else { Ok(id) }
                        });
                    }
                    worker.stats()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Thread 0 trips after its first call, the others never fail.
    assert_eq!(outcomes[0].skipped, 4);
    assert_eq!(outcomes[0].invocations, 1);
    for stats in &outcomes[1..] {
        assert_eq!(stats.successes, 5);
        assert_eq!(stats.skipped, 0);
    }
    assert_eq!(invocations.load(Ordering::SeqCst), 1 + 3 * 5);
}

// ---------------------------------------------------------------------------
// Outcome conversions
// ---------------------------------------------------------------------------

#[test]
fn outcomes_convert_to_results() {
    let mut worker = Executor::new(
        ExecutorConfig::builder("convert")
            .attempt(2)
            .break_after_n_failure(1)
            .build()
            .unwrap(),
    )
    .worker();

    let failed: Result<u8, ExecutionError> = worker.run(|| Err::<u8, _>("nope")).into();
    assert_eq!(
        failed,
        Err(ExecutionError::Exhausted {
            attempts: 2,
            message: "nope".to_string(),
        })
    );

    let skipped: Result<u8, ExecutionError> = worker.run(|| Ok::<u8, &str>(1)).into();
    assert_eq!(skipped, Err(ExecutionError::CircuitOpen));
}

#[test]
fn metrics_sum_over_results() {
    let mut worker = Executor::new(
        ExecutorConfig::builder("metrics")
            .attempt(3)
            .break_after_n_failure(1)
            .build()
            .unwrap(),
    )
    .worker();

    let results = [
        worker.run(|| Ok::<u8, &str>(1)),
        worker.run(|| Err::<u8, &str>("down")),
        worker.run(|| Ok::<u8, &str>(2)),
    ];
    let metrics: ExecMetrics = results.iter().map(ExecMetrics::from_result).sum();

    assert_eq!(
        metrics,
        ExecMetrics {
            success: 1,
            skipped: 1,
            failed: 1,
            total_attempts: 3,
        }
    );
}
