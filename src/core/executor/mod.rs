//! # Executor Module
//!
//! Runs a batch of independent work items under one of four
//! interchangeable concurrency policies.
//!
//! ## Policies
//! - **one_core** - sequential on the caller's thread
//! - **future_thread** - bounded worker-thread pool over a shared queue
//! - **future_core** - bounded CPU pool sized to the core count
//! - **future_core_async** - cooperative dispatcher that submits every
//!   item up front to a CPU pool and suspends while awaiting completions
//!
//! All four share one contract: every submitted item yields exactly one
//! result, a fault inside one item never touches its siblings, results
//! arrive in completion order, and every worker is torn down before
//! `run` returns - on the error paths too. The policies differ only in
//! throughput and ordering, never in observable semantics.

mod core_pool;
mod dispatch;
mod sequential;
mod threads;

pub use core_pool::CorePool;
pub use dispatch::AsyncDispatcher;
pub use sequential::Sequential;
pub use threads::ThreadPool;

use crate::core::work::{UnitOfWork, WorkResult};
use crate::error::ExecError;
use crate::events::{BatchEvent, BatchKind, Event, EventSender};
use serde::{Deserialize, Serialize};

/// Hard ceiling for CPU-pool workers; some platforms cannot wait on
/// more than 61 pool handles at once
pub const MAX_POOL_WORKERS: usize = 61;

/// A batch of work items headed for one destination directory.
#[derive(Debug)]
pub struct Batch {
    pub kind: BatchKind,
    /// Destination directory name, used as the progress label
    pub label: String,
    pub items: Vec<UnitOfWork>,
}

impl Batch {
    pub fn new(kind: BatchKind, label: impl Into<String>, items: Vec<UnitOfWork>) -> Self {
        Self {
            kind,
            label: label.into(),
            items,
        }
    }
}

/// The common contract all four policies implement.
pub trait ExecutionStrategy: Send + Sync {
    /// Run every item to completion and return one result per item.
    ///
    /// `workers` of 0 selects the policy's default worker count.
    /// Results are in completion order, not submission order.
    fn run(
        &self,
        batch: Batch,
        workers: usize,
        events: &EventSender,
    ) -> Result<Vec<WorkResult>, ExecError>;

    /// Which policy this strategy implements
    fn policy(&self) -> ExecutionPolicy;
}

/// Selector for the four execution policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPolicy {
    /// Sequential on the caller's thread
    OneCore,
    /// Bounded CPU pool
    FutureCore,
    /// Bounded worker-thread pool
    FutureThread,
    /// Cooperative dispatcher over a CPU pool
    FutureCoreAsync,
}

impl ExecutionPolicy {
    /// Build the strategy implementing this policy
    pub fn strategy(&self) -> Box<dyn ExecutionStrategy> {
        match self {
            ExecutionPolicy::OneCore => Box::new(Sequential),
            ExecutionPolicy::FutureCore => Box::new(CorePool),
            ExecutionPolicy::FutureThread => Box::new(ThreadPool),
            ExecutionPolicy::FutureCoreAsync => Box::new(AsyncDispatcher),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExecutionPolicy::OneCore => "one_core",
            ExecutionPolicy::FutureCore => "future_core",
            ExecutionPolicy::FutureThread => "future_thread",
            ExecutionPolicy::FutureCoreAsync => "future_core_async",
        }
    }
}

impl std::fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub(crate) fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Copy batches are I/O bound: oversubscribe the cores a little
pub fn copy_worker_default() -> usize {
    available_cpus() * 2 + 2
}

/// Thread-pool joins tolerate heavy oversubscription
pub(crate) fn thread_worker_count(requested: usize) -> usize {
    if requested == 0 {
        available_cpus() * 4 + 2
    } else {
        requested
    }
}

/// CPU pools default to the core count and never exceed the platform cap
pub(crate) fn pool_worker_count(requested: usize) -> usize {
    let count = if requested == 0 {
        available_cpus()
    } else {
        requested
    };
    count.min(MAX_POOL_WORKERS)
}

pub(crate) fn emit_started(events: &EventSender, batch: &Batch, workers: usize) {
    tracing::debug!(
        "workers ({}) for {} items to {}",
        workers,
        batch.items.len(),
        batch.label
    );
    events.send(Event::Batch(BatchEvent::Started {
        kind: batch.kind,
        label: batch.label.clone(),
        total: batch.items.len(),
        workers,
    }));
}

pub(crate) fn emit_item_completed(events: &EventSender, kind: BatchKind, completed: usize) {
    events.send(Event::Batch(BatchEvent::ItemCompleted { kind, completed }));
}

pub(crate) fn emit_completed(events: &EventSender, kind: BatchKind, results: &[WorkResult]) {
    let failed = results.iter().filter(|r| r.error().is_some()).count();
    events.send(Event::Batch(BatchEvent::Completed {
        kind,
        total: results.len(),
        failed,
    }));
}
