//! Sequential execution on the caller's thread.
//!
//! The baseline policy: no workers, no channels, items run in
//! submission order. Used for small batches and as the reference
//! behavior the pooled policies must match.

use super::{emit_completed, emit_item_completed, emit_started, Batch, ExecutionPolicy, ExecutionStrategy};
use crate::core::work::WorkResult;
use crate::error::ExecError;
use crate::events::EventSender;

pub struct Sequential;

impl ExecutionStrategy for Sequential {
    fn run(
        &self,
        batch: Batch,
        _workers: usize,
        events: &EventSender,
    ) -> Result<Vec<WorkResult>, ExecError> {
        emit_started(events, &batch, 1);
        let kind = batch.kind;

        let mut results = Vec::with_capacity(batch.items.len());
        for (completed, item) in batch.items.iter().enumerate() {
            results.push(item.execute());
            emit_item_completed(events, kind, completed + 1);
        }

        emit_completed(events, kind, &results);
        Ok(results)
    }

    fn policy(&self) -> ExecutionPolicy {
        ExecutionPolicy::OneCore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::work::{CopyWork, UnitOfWork};
    use crate::events::null_sender;
    use tempfile::TempDir;

    #[test]
    fn empty_batch_yields_empty_results() {
        let batch = Batch::new(crate::events::BatchKind::Copy, "Output", Vec::new());
        let results = Sequential.run(batch, 0, &null_sender()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn results_follow_submission_order() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let mut items = Vec::new();
        for i in 0..4 {
            let source = src.path().join(format!("file-{i}.txt"));
            std::fs::write(&source, b"x").unwrap();
            items.push(UnitOfWork::Copy(CopyWork {
                source,
                dest_dir: dst.path().to_path_buf(),
            }));
        }

        let batch = Batch::new(crate::events::BatchKind::Copy, "Output", items);
        let results = Sequential.run(batch, 0, &null_sender()).unwrap();

        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            assert!(result.source().ends_with(format!("file-{i}.txt")));
        }
    }
}
