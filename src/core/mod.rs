//! # Core Module
//!
//! The UI-agnostic reconcile-and-join engine.
//!
//! ## Modules
//! - `index` - builds the stem-keyed file index of a directory
//! - `reconcile` - classifies two indexes into matched/unmatched sets
//! - `work` - the copy and join units of work
//! - `fuse` - side-by-side image composition
//! - `similarity` - pluggable pairwise similarity scoring
//! - `executor` - the four interchangeable execution policies
//! - `pipeline` - orchestrates the full run
//! - `reporter` - CSV result sinks

pub mod executor;
pub mod fuse;
pub mod index;
pub mod pipeline;
pub mod reconcile;
pub mod reporter;
pub mod similarity;
pub mod work;

// Re-export commonly used types
pub use executor::{ExecutionPolicy, ExecutionStrategy};
pub use index::{FileIndex, FileRecord};
pub use pipeline::{Pipeline, PipelineResult};
pub use reconcile::{reconcile, Reconciliation};
pub use similarity::SimilarityKind;
pub use work::{UnitOfWork, WorkResult};
