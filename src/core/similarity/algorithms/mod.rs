//! Similarity algorithm implementations.
//!
//! The descriptor-based matchers share keypoint detection and the
//! nearest/second-nearest ratio test; each contributes its own
//! descriptor extraction and distance metric.

mod fast;
mod orb;
mod sift;
mod template;

pub use fast::FastStub;
pub use orb::OrbMatcher;
pub use sift::SiftMatcher;
pub use template::TemplateMatcher;

use image::GrayImage;
use imageproc::corners::{corners_fast9, Corner};

/// FAST-9 corner threshold on binarized input
const FAST_THRESHOLD: u8 = 20;

/// Keypoints closer than this to any edge are dropped so that every
/// descriptor patch fits inside the image
pub(crate) const PATCH_BORDER: u32 = 16;

/// Strongest keypoints kept per image
const MAX_KEYPOINTS: usize = 500;

/// Nearest-distance must undercut this fraction of the second-nearest
/// distance for a match to be accepted
const RATIO_TEST: f64 = 0.75;

/// Detect keypoints for descriptor extraction.
///
/// Corners are ranked by FAST score; the stable sort keeps scan order
/// on ties, so detection is deterministic for identical input.
pub(crate) fn detect_keypoints(image: &GrayImage) -> Vec<Corner> {
    let (width, height) = image.dimensions();
    if width <= 2 * PATCH_BORDER || height <= 2 * PATCH_BORDER {
        return Vec::new();
    }

    let mut corners: Vec<Corner> = corners_fast9(image, FAST_THRESHOLD)
        .into_iter()
        .filter(|c| {
            c.x >= PATCH_BORDER
                && c.y >= PATCH_BORDER
                && c.x < width - PATCH_BORDER
                && c.y < height - PATCH_BORDER
        })
        .collect();

    corners.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    corners.truncate(MAX_KEYPOINTS);
    corners
}

/// Count descriptor matches that survive the ratio test.
///
/// For each descriptor on the left, the two nearest neighbours on the
/// right are found; the pair is accepted only when the nearest is
/// clearly better than the runner-up. This rejects ambiguous matches
/// between repetitive structures.
pub(crate) fn ratio_matches<D, F>(left: &[D], right: &[D], distance: F) -> usize
where
    F: Fn(&D, &D) -> f64,
{
    if right.len() < 2 {
        // A single candidate has no runner-up to compare against
        return 0;
    }

    let mut accepted = 0;
    for query in left {
        let mut nearest = f64::INFINITY;
        let mut second = f64::INFINITY;
        for candidate in right {
            let d = distance(query, candidate);
            if d < nearest {
                second = nearest;
                nearest = d;
            } else if d < second {
                second = d;
            }
        }
        if nearest < RATIO_TEST * second {
            accepted += 1;
        }
    }
    accepted
}

/// Ratio-test score: accepted matches over the larger keypoint count.
///
/// `None` when either side produced no keypoints at all.
pub(crate) fn ratio_score(matches: usize, left_count: usize, right_count: usize) -> Option<f64> {
    if left_count == 0 || right_count == 0 {
        return None;
    }
    Some(matches as f64 / left_count.max(right_count) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_matches_accepts_clear_winners() {
        // 1-d descriptors: 0.0 matches 0.1 clearly against 10.0
        let left = vec![0.0_f64];
        let right = vec![0.1_f64, 10.0_f64];

        let matches = ratio_matches(&left, &right, |a, b| (a - b).abs());
        assert_eq!(matches, 1);
    }

    #[test]
    fn ratio_matches_rejects_ambiguous_pairs() {
        let left = vec![0.0_f64];
        let right = vec![1.0_f64, 1.1_f64];

        let matches = ratio_matches(&left, &right, |a, b| (a - b).abs());
        assert_eq!(matches, 0);
    }

    #[test]
    fn ratio_score_is_none_without_keypoints() {
        assert_eq!(ratio_score(0, 0, 10), None);
        assert_eq!(ratio_score(0, 10, 0), None);
    }

    #[test]
    fn ratio_score_is_bounded_by_one() {
        let score = ratio_score(10, 10, 20).unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(score, 0.5);
    }

    #[test]
    fn keypoints_respect_the_patch_border() {
        let image = GrayImage::from_fn(64, 64, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        });

        for corner in detect_keypoints(&image) {
            assert!(corner.x >= PATCH_BORDER && corner.x < 64 - PATCH_BORDER);
            assert!(corner.y >= PATCH_BORDER && corner.y < 64 - PATCH_BORDER);
        }
    }

    #[test]
    fn tiny_images_yield_no_keypoints() {
        let image = GrayImage::from_pixel(16, 16, image::Luma([255]));
        assert!(detect_keypoints(&image).is_empty());
    }
}
