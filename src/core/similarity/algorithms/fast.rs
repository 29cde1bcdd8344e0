//! FAST keypoint scoring placeholder.
//!
//! The `fast` registry entry has never produced a real score: it is
//! kept so that selecting it is not an error, but it always reports
//! that no score is available. The scoring semantics for bare FAST
//! keypoints (no descriptors) were never settled.

use super::super::{SimilarityAlgorithm, SimilarityKind};
use image::GrayImage;

/// Registered stub; always yields `None`
#[derive(Debug)]
pub struct FastStub;

impl SimilarityAlgorithm for FastStub {
    fn score(&self, _left: &GrayImage, _right: &GrayImage) -> Option<f64> {
        tracing::debug!("fast similarity is not implemented; no score produced");
        None
    }

    fn kind(&self) -> SimilarityKind {
        SimilarityKind::Fast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn stub_never_scores() {
        let image = GrayImage::from_pixel(32, 32, Luma([255]));
        assert_eq!(FastStub.score(&image, &image), None);
    }
}
