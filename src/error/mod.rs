//! # Error Module
//!
//! Error types for the reconcile-and-join engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-item vs batch-level** - a failing unit of work is recorded in its
//!   `WorkResult`; only degenerate input or pool creation aborts a phase

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum JoinerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Executor error: {0}")]
    Exec(#[from] ExecError),

    #[error("Report export error: {0}")]
    Report(#[from] ReportError),

    #[error("Input directory {path} produced an empty index")]
    InvalidIndex { path: PathBuf },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while building a file index
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-item failures captured inside a `WorkResult`.
///
/// These never abort the enclosing batch; they are aggregated and
/// reported after the batch completes.
#[derive(Error, Debug)]
pub enum WorkError {
    #[error("Failed to copy {path}: {reason}")]
    CopyFailure { path: PathBuf, reason: String },

    #[error("Unsupported image format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Failed to write fused image {path}: {reason}")]
    EncodeError { path: PathBuf, reason: String },
}

/// Errors raised when an execution strategy cannot run at all.
///
/// Item-level faults are never surfaced here - only failure to stand up
/// the worker pool itself is batch-fatal.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to spawn worker thread: {0}")]
    SpawnFailed(String),

    #[error("Failed to build worker pool: {0}")]
    PoolBuildFailed(String),

    #[error("Failed to build dispatcher runtime: {0}")]
    RuntimeBuildFailed(String),
}

/// Similarity algorithm selection failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown similarity algorithm: {name}")]
pub struct UnknownAlgorithm {
    pub name: String,
}

/// Errors that occur while appending CSV reports
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write csv {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, JoinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/scans/input_1"),
        };
        assert!(error.to_string().contains("/scans/input_1"));
    }

    #[test]
    fn work_error_includes_path_and_reason() {
        let error = WorkError::DecodeError {
            path: PathBuf::from("/scans/broken.tif"),
            reason: "truncated TIFF".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/scans/broken.tif"));
        assert!(message.contains("truncated TIFF"));
    }

    #[test]
    fn unknown_algorithm_names_the_offender() {
        let error = UnknownAlgorithm {
            name: "surf".to_string(),
        };
        assert!(error.to_string().contains("surf"));
    }
}
