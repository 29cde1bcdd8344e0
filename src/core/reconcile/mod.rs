//! # Reconcile Module
//!
//! Classifies two file indexes into matched and one-sided sets by stem.
//!
//! This is a pure set operation over already-built indexes: no I/O, no
//! policy. Whether an empty index is acceptable is decided by the
//! pipeline, not here.

use crate::core::index::{FileIndex, FileRecord};

/// The three-way classification of two indexes.
///
/// Every stem from either index lands in exactly one of the three
/// buckets. `common` follows the right index's scan order; the one-sided
/// sets follow their own index's scan order.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Stems present in both indexes, as (left record, right record) pairs
    pub common: Vec<(FileRecord, FileRecord)>,
    /// Records whose stem only appears in the left index
    pub left_only: Vec<FileRecord>,
    /// Records whose stem only appears in the right index
    pub right_only: Vec<FileRecord>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.common.is_empty() && self.left_only.is_empty() && self.right_only.is_empty()
    }
}

/// Compute the intersection and both one-sided differences of two indexes.
pub fn reconcile(left: &FileIndex, right: &FileIndex) -> Reconciliation {
    let mut result = Reconciliation::default();

    for record in right.iter() {
        match left.get(&record.stem) {
            Some(partner) => result.common.push((partner.clone(), record.clone())),
            None => result.right_only.push(record.clone()),
        }
    }

    for record in left.iter() {
        if !right.contains(&record.stem) {
            result.left_only.push(record.clone());
        }
    }

    result
}
