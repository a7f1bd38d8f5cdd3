//! Execution engine - applies an operation across targets with isolated failures

use crate::context::{NoProgress, ProgressCallback};
use crate::error::{BatchError, Result};
use crate::operation::{BatchTarget, Operation};
use crate::types::{BatchReport, ExecutionMode, Outcome, TargetReport};
use rayon::prelude::*;
use std::time::Instant;

/// Execute `op` against every target
///
/// Per-pair failures are recorded in the report and never abort the batch.
/// Only precondition failures (no targets, no worker pool) return `Err`.
///
/// # Arguments
/// * `op` - The operation to apply
/// * `targets` - Targets in processing order
/// * `mode` - Sequential, or bounded parallel across targets
/// * `progress` - Progress callback
pub fn execute<O, P>(
    op: &O,
    targets: &[O::Target],
    mode: ExecutionMode,
    progress: &mut P,
) -> Result<BatchReport>
where
    O: Operation,
    P: ProgressCallback,
{
    if targets.is_empty() {
        return Err(BatchError::NoTargets);
    }

    log::debug!(
        "Running {} over {} target(s) ({:?})",
        op.name(),
        targets.len(),
        mode
    );

    let reports = match mode {
        ExecutionMode::Parallel { jobs } if jobs > 1 && targets.len() > 1 => {
            execute_parallel(op, targets, jobs, progress)?
        }
        _ => targets
            .iter()
            .map(|target| run_target(op, target, progress))
            .collect(),
    };

    let mut aggregate = BatchReport::new();
    for (target, report) in targets.iter().zip(reports) {
        aggregate.insert(target.name(), &target.location(), report);
    }
    Ok(aggregate)
}

/// Execute targets in parallel using rayon
fn execute_parallel<O, P>(
    op: &O,
    targets: &[O::Target],
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<TargetReport>>
where
    O: Operation,
    P: ProgressCallback,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| BatchError::ThreadPool(e.to_string()))?;

    // The callback is not shared across workers; results are reported after.
    let reports: Vec<TargetReport> = pool.install(|| {
        targets
            .par_iter()
            .map(|target| run_target(op, target, &mut NoProgress))
            .collect()
    });

    for (target, report) in targets.iter().zip(&reports) {
        progress.on_target_start(target.name(), report.total());
        progress.on_target_complete(target.name(), report);
    }

    Ok(reports)
}

/// Run every entry of one target sequentially
fn run_target<O, P>(op: &O, target: &O::Target, progress: &mut P) -> TargetReport
where
    O: Operation,
    P: ProgressCallback + ?Sized,
{
    let started = Instant::now();
    let mut report = TargetReport::default();

    let entries = match op.entries(target) {
        Ok(entries) => entries,
        Err(failure) => {
            log::warn!(
                "{}: could not list entries for {}: {}",
                op.name(),
                target.name(),
                failure.error
            );
            progress.on_target_start(target.name(), 0);
            report.record(Outcome::Failed(failure));
            report.elapsed = started.elapsed();
            progress.on_target_complete(target.name(), &report);
            return report;
        }
    };

    progress.on_target_start(target.name(), entries.len());

    for entry in &entries {
        let description = op.describe(entry);
        progress.on_entry_start(target.name(), &description);

        let outcome = match op.apply(target, entry) {
            Ok(outcome) => outcome,
            Err(failure) => Outcome::Failed(failure),
        };

        if let Outcome::Failed(failure) = &outcome {
            log::debug!(
                "{} {} in {} failed: {}",
                op.name(),
                description,
                target.name(),
                failure.error
            );
        }

        progress.on_entry_complete(target.name(), &outcome);
        report.record(outcome);
    }

    report.elapsed = started.elapsed();
    progress.on_target_complete(target.name(), &report);
    report
}
