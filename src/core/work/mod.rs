//! # Work Module
//!
//! The uniform unit of work the execution strategies run.
//!
//! Two item kinds exist: copy one file into a destination directory,
//! or join one image pair (fuse side by side, optionally score
//! similarity). `execute` is infallible by construction - any fault
//! inside an item is captured into that item's result, so a batch can
//! never be aborted by a single bad file.

use crate::core::fuse;
use crate::core::similarity::{self, SimilarityKind};
use crate::error::WorkError;
use std::path::{Path, PathBuf};

/// One copy-a-file work item
#[derive(Debug, Clone)]
pub struct CopyWork {
    pub source: PathBuf,
    pub dest_dir: PathBuf,
}

/// One join-a-pair work item
#[derive(Debug, Clone)]
pub struct JoinWork {
    pub left: PathBuf,
    pub right: PathBuf,
    pub dest_dir: PathBuf,
    /// Algorithm to score the pair with, or `None` to skip similarity
    pub similarity: Option<SimilarityKind>,
}

/// A self-contained work item, consumed exactly once by a strategy
#[derive(Debug, Clone)]
pub enum UnitOfWork {
    Copy(CopyWork),
    Join(JoinWork),
}

/// Outcome of a copy item
#[derive(Debug)]
pub struct CopyOutcome {
    /// Source filename, for error listings
    pub source: PathBuf,
    pub error: Option<WorkError>,
}

/// Outcome of a join item
#[derive(Debug)]
pub struct JoinOutcome {
    /// Left-hand source image the fused artifact is named after
    pub source: PathBuf,
    pub score: Option<f64>,
    pub error: Option<WorkError>,
}

/// Exactly one of these is produced per submitted `UnitOfWork`
#[derive(Debug)]
pub enum WorkResult {
    Copy(CopyOutcome),
    Join(JoinOutcome),
}

impl WorkResult {
    /// The captured per-item failure, if any
    pub fn error(&self) -> Option<&WorkError> {
        match self {
            WorkResult::Copy(outcome) => outcome.error.as_ref(),
            WorkResult::Join(outcome) => outcome.error.as_ref(),
        }
    }

    /// Source path the item worked on
    pub fn source(&self) -> &Path {
        match self {
            WorkResult::Copy(outcome) => &outcome.source,
            WorkResult::Join(outcome) => &outcome.source,
        }
    }
}

impl UnitOfWork {
    /// Run the item to completion, capturing any fault into the result.
    pub fn execute(&self) -> WorkResult {
        match self {
            UnitOfWork::Copy(work) => WorkResult::Copy(work.run()),
            UnitOfWork::Join(work) => WorkResult::Join(work.run()),
        }
    }
}

impl CopyWork {
    fn run(&self) -> CopyOutcome {
        let outcome = |error| CopyOutcome {
            source: self.source.clone(),
            error,
        };

        if !self.source.is_file() {
            tracing::error!("error copy: {}", self.source.display());
            return outcome(Some(WorkError::CopyFailure {
                path: self.source.clone(),
                reason: "not a regular file".to_string(),
            }));
        }

        let Some(name) = self.source.file_name() else {
            return outcome(Some(WorkError::CopyFailure {
                path: self.source.clone(),
                reason: "source has no file name".to_string(),
            }));
        };

        match std::fs::copy(&self.source, self.dest_dir.join(name)) {
            Ok(_) => {
                tracing::debug!("copied: {}", name.to_string_lossy());
                outcome(None)
            }
            Err(e) => {
                tracing::error!("error copy: {}", self.source.display());
                outcome(Some(WorkError::CopyFailure {
                    path: self.source.clone(),
                    reason: e.to_string(),
                }))
            }
        }
    }
}

impl JoinWork {
    fn run(&self) -> JoinOutcome {
        let failed = |error| JoinOutcome {
            source: self.left.clone(),
            score: None,
            error: Some(error),
        };

        // Either side can vanish between reconciliation and execution
        for path in [&self.left, &self.right] {
            if !path.is_file() {
                return failed(WorkError::CopyFailure {
                    path: path.clone(),
                    reason: "not a regular file".to_string(),
                });
            }
        }

        let fusion = match fuse::fuse(&self.left, &self.right) {
            Ok(fusion) => fusion,
            Err(e) => {
                tracing::error!("{e}");
                return failed(e);
            }
        };

        if let Err(e) = fuse::write_fused(&fusion, &self.left, &self.dest_dir) {
            tracing::error!("{e}");
            return failed(e);
        }

        // Scored on the same size-matched pair the canvas was built from
        let score = self
            .similarity
            .and_then(|kind| similarity::score_pair(kind, &fusion.left, &fusion.right));

        JoinOutcome {
            source: self.left.clone(),
            score,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgb([20, 20, 20])
            } else {
                Rgb([230, 230, 230])
            }
        });
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn copy_lands_in_destination() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("scan.tif");
        std::fs::write(&source, b"payload").unwrap();

        let result = UnitOfWork::Copy(CopyWork {
            source,
            dest_dir: dst_dir.path().to_path_buf(),
        })
        .execute();

        assert!(result.error().is_none());
        assert_eq!(
            std::fs::read(dst_dir.path().join("scan.tif")).unwrap(),
            b"payload"
        );
    }

    #[test]
    fn copy_of_missing_source_captures_the_error() {
        let dst_dir = TempDir::new().unwrap();

        let result = UnitOfWork::Copy(CopyWork {
            source: PathBuf::from("/nonexistent/scan.tif"),
            dest_dir: dst_dir.path().to_path_buf(),
        })
        .execute();

        assert!(matches!(
            result.error(),
            Some(WorkError::CopyFailure { .. })
        ));
    }

    #[test]
    fn join_writes_fused_artifact() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let left = write_image(src_dir.path(), "pair.png", 32, 32);
        let right = write_image(src_dir.path(), "other.png", 32, 32);

        let result = UnitOfWork::Join(JoinWork {
            left,
            right,
            dest_dir: dst_dir.path().to_path_buf(),
            similarity: None,
        })
        .execute();

        assert!(result.error().is_none());
        assert!(dst_dir.path().join("pair.tif").is_file());
        match result {
            WorkResult::Join(outcome) => assert_eq!(outcome.score, None),
            _ => panic!("wrong result kind"),
        }
    }

    #[test]
    fn join_with_similarity_scores_identical_pair_at_one() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let left = write_image(src_dir.path(), "a.png", 48, 48);
        let right = write_image(src_dir.path(), "b.png", 48, 48);

        let result = UnitOfWork::Join(JoinWork {
            left,
            right,
            dest_dir: dst_dir.path().to_path_buf(),
            similarity: Some(SimilarityKind::TemplateMatch),
        })
        .execute();

        match result {
            WorkResult::Join(outcome) => {
                assert!(outcome.error.is_none());
                assert_eq!(outcome.score, Some(1.0));
            }
            _ => panic!("wrong result kind"),
        }
    }

    #[test]
    fn join_of_unsupported_format_is_captured_not_fatal() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let left = src_dir.path().join("scan.bmp");
        std::fs::write(&left, b"x").unwrap();
        let right = write_image(src_dir.path(), "other.png", 16, 16);

        let result = UnitOfWork::Join(JoinWork {
            left,
            right,
            dest_dir: dst_dir.path().to_path_buf(),
            similarity: None,
        })
        .execute();

        assert!(matches!(
            result.error(),
            Some(WorkError::UnsupportedFormat { .. })
        ));
    }
}
