//! Bounded worker-thread pool over a shared job queue.
//!
//! Workers pull items off a crossbeam channel and push results back on
//! another; the queue closing is the shutdown signal, so the pool
//! drains and joins without any stop flag. Suited to I/O-bound copy
//! batches where threads mostly wait on the filesystem.

use super::{
    emit_completed, emit_item_completed, emit_started, thread_worker_count, Batch,
    ExecutionPolicy, ExecutionStrategy,
};
use crate::core::work::{UnitOfWork, WorkResult};
use crate::error::ExecError;
use crate::events::EventSender;
use crossbeam_channel::unbounded;
use std::thread;

pub struct ThreadPool;

impl ExecutionStrategy for ThreadPool {
    fn run(
        &self,
        batch: Batch,
        workers: usize,
        events: &EventSender,
    ) -> Result<Vec<WorkResult>, ExecError> {
        let total = batch.items.len();
        let worker_count = thread_worker_count(workers).min(total).max(1);
        emit_started(events, &batch, worker_count);
        let kind = batch.kind;

        let (job_tx, job_rx) = unbounded::<UnitOfWork>();
        let (result_tx, result_rx) = unbounded::<WorkResult>();

        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("copy-worker-{i}"))
                .spawn(move || {
                    while let Ok(item) = jobs.recv() {
                        let _ = results.send(item.execute());
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Close the queue so already-spawned workers drain
                    // and exit before the error propagates
                    drop(job_tx);
                    drop(job_rx);
                    drop(result_tx);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(ExecError::SpawnFailed(e.to_string()));
                }
            }
        }
        drop(job_rx);
        drop(result_tx);

        for item in batch.items {
            let _ = job_tx.send(item);
        }
        drop(job_tx);

        let mut results = Vec::with_capacity(total);
        for result in result_rx.iter() {
            results.push(result);
            emit_item_completed(events, kind, results.len());
        }

        for handle in handles {
            let _ = handle.join();
        }

        emit_completed(events, kind, &results);
        Ok(results)
    }

    fn policy(&self) -> ExecutionPolicy {
        ExecutionPolicy::FutureThread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::work::{CopyWork, UnitOfWork};
    use crate::events::null_sender;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn copy_batch(count: usize, src: &TempDir, dst: &TempDir) -> Batch {
        let items = (0..count)
            .map(|i| {
                let source = src.path().join(format!("file-{i}.txt"));
                std::fs::write(&source, b"x").unwrap();
                UnitOfWork::Copy(CopyWork {
                    source,
                    dest_dir: dst.path().to_path_buf(),
                })
            })
            .collect();
        Batch::new(crate::events::BatchKind::Copy, "Output", items)
    }

    #[test]
    fn every_item_yields_exactly_one_result() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();

        let results = ThreadPool
            .run(copy_batch(25, &src, &dst), 4, &null_sender())
            .unwrap();

        assert_eq!(results.len(), 25);
        let mut names: Vec<_> = results
            .iter()
            .map(|r| r.source().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 25, "duplicate or lost results");
    }

    #[test]
    fn one_bad_item_does_not_disturb_the_rest() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let mut batch = copy_batch(9, &src, &dst);
        batch.items.push(UnitOfWork::Copy(CopyWork {
            source: PathBuf::from("/nonexistent/ghost.txt"),
            dest_dir: dst.path().to_path_buf(),
        }));

        let results = ThreadPool.run(batch, 3, &null_sender()).unwrap();

        assert_eq!(results.len(), 10);
        assert_eq!(results.iter().filter(|r| r.error().is_some()).count(), 1);
    }

    #[test]
    fn empty_batch_completes_immediately() {
        let batch = Batch::new(crate::events::BatchKind::Copy, "Output", Vec::new());
        let results = ThreadPool.run(batch, 0, &null_sender()).unwrap();
        assert!(results.is_empty());
    }
}
