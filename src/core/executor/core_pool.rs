//! Bounded CPU pool for compute-heavy join batches.
//!
//! Builds a dedicated rayon pool sized to the core count (capped at
//! the platform limit) so image decode, fusion and scoring saturate
//! the CPUs without touching the global pool. Dropping the pool joins
//! every worker, which is what makes the teardown guarantee hold on
//! both the success and error paths.

use super::{
    emit_completed, emit_item_completed, emit_started, pool_worker_count, Batch, ExecutionPolicy,
    ExecutionStrategy,
};
use crate::core::work::WorkResult;
use crate::error::ExecError;
use crate::events::EventSender;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct CorePool;

impl ExecutionStrategy for CorePool {
    fn run(
        &self,
        batch: Batch,
        workers: usize,
        events: &EventSender,
    ) -> Result<Vec<WorkResult>, ExecError> {
        let worker_count = pool_worker_count(workers);
        emit_started(events, &batch, worker_count);
        let kind = batch.kind;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("join-core-{i}"))
            .build()
            .map_err(|e| ExecError::PoolBuildFailed(e.to_string()))?;

        let completed = AtomicUsize::new(0);
        let results: Vec<WorkResult> = pool.install(|| {
            batch
                .items
                .into_par_iter()
                .map(|item| {
                    let result = item.execute();
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    emit_item_completed(events, kind, done);
                    result
                })
                .collect()
        });
        drop(pool);

        emit_completed(events, kind, &results);
        Ok(results)
    }

    fn policy(&self) -> ExecutionPolicy {
        ExecutionPolicy::FutureCore
    }
}
