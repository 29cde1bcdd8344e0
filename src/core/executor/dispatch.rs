//! Cooperative dispatcher over a CPU pool.
//!
//! A single-threaded runtime submits every item to the pool up front,
//! then suspends at the completion channel until all results have come
//! back. Each worker receives a self-contained item and sends back a
//! self-contained result; nothing else crosses the boundary. The
//! output is identical to the plain CPU pool - only the submitting
//! side's waiting behavior differs.

use super::{
    emit_completed, emit_item_completed, emit_started, pool_worker_count, Batch, ExecutionPolicy,
    ExecutionStrategy,
};
use crate::core::work::WorkResult;
use crate::error::ExecError;
use crate::events::EventSender;

pub struct AsyncDispatcher;

impl ExecutionStrategy for AsyncDispatcher {
    fn run(
        &self,
        batch: Batch,
        workers: usize,
        events: &EventSender,
    ) -> Result<Vec<WorkResult>, ExecError> {
        let worker_count = pool_worker_count(workers);
        emit_started(events, &batch, worker_count);
        let kind = batch.kind;
        let total = batch.items.len();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("join-dispatch-{i}"))
            .build()
            .map_err(|e| ExecError::PoolBuildFailed(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| ExecError::RuntimeBuildFailed(e.to_string()))?;

        let results = runtime.block_on(async {
            let (result_tx, mut result_rx) = tokio::sync::mpsc::unbounded_channel::<WorkResult>();

            for item in batch.items {
                let result_tx = result_tx.clone();
                pool.spawn(move || {
                    let _ = result_tx.send(item.execute());
                });
            }
            // The channel closes once the last worker drops its sender
            drop(result_tx);

            let mut results = Vec::with_capacity(total);
            while let Some(result) = result_rx.recv().await {
                results.push(result);
                emit_item_completed(events, kind, results.len());
            }
            results
        });

        // Joins the pool workers; the runtime has nothing left pending
        drop(pool);
        drop(runtime);

        emit_completed(events, kind, &results);
        Ok(results)
    }

    fn policy(&self) -> ExecutionPolicy {
        ExecutionPolicy::FutureCoreAsync
    }
}
