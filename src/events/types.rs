//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the reconcile-and-join pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Index-building events
    Scan(ScanEvent),
    /// Copy/join batch events
    Batch(BatchEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while building the two file indexes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Indexing of a directory has started
    Started { path: PathBuf },
    /// Indexing of a directory completed
    Completed { path: PathBuf, total_files: usize },
}

/// Which kind of work a batch carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchKind {
    Copy,
    Join,
}

/// Events during a copy or join batch.
///
/// `ItemCompleted.completed` is a monotonically increasing count within
/// one batch; items complete in an arbitrary order, so no path is
/// attached to the count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// A batch was submitted to an execution strategy
    Started {
        kind: BatchKind,
        /// Destination directory name, used as the progress label
        label: String,
        total: usize,
        workers: usize,
    },
    /// One unit of work finished (success or captured failure)
    ItemCompleted { kind: BatchKind, completed: usize },
    /// The batch drained and its workers were torn down
    Completed {
        kind: BatchKind,
        total: usize,
        failed: usize,
    },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Indexing,
    Reconciling,
    Copying,
    Joining,
    Reporting,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Files indexed in input1
    pub input1_files: usize,
    /// Files indexed in input2
    pub input2_files: usize,
    /// Matched stem pairs
    pub common: usize,
    /// Stems only present in input1
    pub left_only: usize,
    /// Stems only present in input2
    pub right_only: usize,
    /// Copy units that failed
    pub copy_errors: usize,
    /// Join units that failed
    pub join_errors: usize,
    /// Similarity scores computed
    pub scores: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Indexing => write!(f, "Indexing"),
            PipelinePhase::Reconciling => write!(f, "Reconciling"),
            PipelinePhase::Copying => write!(f, "Copying"),
            PipelinePhase::Joining => write!(f, "Joining"),
            PipelinePhase::Reporting => write!(f, "Reporting"),
        }
    }
}
