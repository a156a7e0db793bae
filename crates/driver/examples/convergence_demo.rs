//! Convergence over a flaky lookup service
//!
//! Each item fails `id % 4` times before answering, and every 13th item
//! never answers. Run with `RUST_LOG=converge=debug` to see per-attempt logs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use converge_driver::{ConvergenceDriver, DriverConfig, Recover, RecoveryMode};
use converge_resilience::{ExecutionError, ExecutorConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let driver = ConvergenceDriver::build(
        ExecutorConfig::builder("lookup")
            .attempt(1)
            .backoff(Duration::from_millis(1))
            .rate_limit_per_seconds(500),
        DriverConfig {
            max_passes: 4,
            partitions: Some(4),
            recovery: RecoveryMode::OnExhaustion,
            ..DriverConfig::default()
        },
    )?;

    let items: Vec<usize> = (1..=40).collect();
    let calls: Vec<AtomicUsize> = (0..=40).map(|_| AtomicUsize::new(0)).collect();

    let lookup = |id: &usize| {
        let seen = calls[*id].fetch_add(1, Ordering::SeqCst);
        if id % 13 == 0 {
            Err(format!("item {id}: not found"))
        } else if seen < id % 4 {
            Err(format!("item {id}: timeout"))
        } else {
            Ok(id * 100)
        }
    };
    let integrate = |id: &usize, result: Result<&usize, ExecutionError>| match result {
        Ok(value) => format!("{id} => {value}"),
        Err(err) => format!("{id} => unresolved ({err})"),
    };
    let fallback: &Recover<'_, usize, usize> = &|_| Some(0);

    let report = driver.run_with_report(items, lookup, integrate, Some(fallback));

    for pass in &report.passes {
        println!("pass {}: {}", pass.pass, pass.metrics);
    }
    println!(
        "converged={} extra_passes={} invocations={} recovered={}",
        report.converged(),
        report.extra_passes(),
        report.invocations(),
        report.recovered,
    );
    for line in report.outputs.iter().filter(|line| line.ends_with("=> 0")) {
        println!("fallback: {line}");
    }

    Ok(())
}
