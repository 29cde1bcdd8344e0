//! Binary-descriptor ratio matching over FAST keypoints.
//!
//! Descriptors are 256 brightness comparisons sampled at fixed offsets
//! inside a 31x31 patch around each keypoint, packed into four u64
//! words and compared by Hamming distance. The offset pattern is
//! generated once from a fixed seed, so descriptors are identical
//! across runs and across both sides of a pair.

use super::super::{SimilarityAlgorithm, SimilarityKind};
use super::{detect_keypoints, ratio_matches, ratio_score};
use image::GrayImage;
use imageproc::corners::Corner;
use std::sync::OnceLock;

/// Comparisons per descriptor
const DESCRIPTOR_BITS: usize = 256;

/// Sampling offsets stay within the keypoint patch
const SAMPLE_RADIUS: i64 = 15;

const PATTERN_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

type BinaryDescriptor = [u64; 4];

/// Offset pairs for the brightness comparisons, fixed for the process
/// lifetime.
fn sample_pattern() -> &'static Vec<(i64, i64, i64, i64)> {
    static PATTERN: OnceLock<Vec<(i64, i64, i64, i64)>> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let mut state = PATTERN_SEED;
        let mut next_offset = move || {
            // splitmix64 step; only the high bits are used
            state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^= z >> 31;
            (z >> 33) as i64 % (2 * SAMPLE_RADIUS + 1) - SAMPLE_RADIUS
        };
        (0..DESCRIPTOR_BITS)
            .map(|_| (next_offset(), next_offset(), next_offset(), next_offset()))
            .collect()
    })
}

fn describe(image: &GrayImage, corner: &Corner) -> BinaryDescriptor {
    let cx = i64::from(corner.x);
    let cy = i64::from(corner.y);
    let mut descriptor = [0u64; 4];

    for (bit, (dx1, dy1, dx2, dy2)) in sample_pattern().iter().enumerate() {
        let first = image.get_pixel((cx + dx1) as u32, (cy + dy1) as u32)[0];
        let second = image.get_pixel((cx + dx2) as u32, (cy + dy2) as u32)[0];
        if first < second {
            descriptor[bit / 64] |= 1 << (bit % 64);
        }
    }
    descriptor
}

fn hamming(a: &BinaryDescriptor, b: &BinaryDescriptor) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum::<u32>() as f64
}

/// ORB-style matcher
#[derive(Default, Debug)]
pub struct OrbMatcher;

impl SimilarityAlgorithm for OrbMatcher {
    fn score(&self, left: &GrayImage, right: &GrayImage) -> Option<f64> {
        let left_keypoints = detect_keypoints(left);
        let right_keypoints = detect_keypoints(right);

        let left_descriptors: Vec<BinaryDescriptor> = left_keypoints
            .iter()
            .map(|corner| describe(left, corner))
            .collect();
        let right_descriptors: Vec<BinaryDescriptor> = right_keypoints
            .iter()
            .map(|corner| describe(right, corner))
            .collect();

        let matches = ratio_matches(&left_descriptors, &right_descriptors, hamming);
        ratio_score(matches, left_descriptors.len(), right_descriptors.len())
    }

    fn kind(&self) -> SimilarityKind {
        SimilarityKind::Orb
    }
}
