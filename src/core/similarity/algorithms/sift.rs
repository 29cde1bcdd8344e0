//! Gradient-histogram ratio matching over FAST keypoints.
//!
//! Each keypoint gets a 128-dimensional descriptor: the 16x16 patch
//! around it is split into a 4x4 grid of cells, and each cell
//! accumulates its gradient magnitudes into 8 orientation bins. The
//! descriptor is L2-normalized and compared by Euclidean distance.

use super::super::{SimilarityAlgorithm, SimilarityKind};
use super::{detect_keypoints, ratio_matches, ratio_score};
use image::GrayImage;
use imageproc::corners::Corner;

const CELL_GRID: usize = 4;
const CELL_SIZE: i64 = 4;
const ORIENTATION_BINS: usize = 8;
const DESCRIPTOR_LEN: usize = CELL_GRID * CELL_GRID * ORIENTATION_BINS;

type GradientDescriptor = [f32; DESCRIPTOR_LEN];

fn pixel(image: &GrayImage, x: i64, y: i64) -> f32 {
    f32::from(image.get_pixel(x as u32, y as u32)[0])
}

fn describe(image: &GrayImage, corner: &Corner) -> GradientDescriptor {
    let cx = i64::from(corner.x);
    let cy = i64::from(corner.y);
    let half = (CELL_GRID as i64 * CELL_SIZE) / 2;
    let mut descriptor = [0f32; DESCRIPTOR_LEN];

    for dy in -half..half {
        for dx in -half..half {
            let x = cx + dx;
            let y = cy + dy;
            // Central differences; the patch border guarantee keeps
            // x±1 and y±1 inside the image
            let gx = pixel(image, x + 1, y) - pixel(image, x - 1, y);
            let gy = pixel(image, x, y + 1) - pixel(image, x, y - 1);
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude == 0.0 {
                continue;
            }

            let angle = gy.atan2(gx);
            let turn = (angle + std::f32::consts::PI) / (2.0 * std::f32::consts::PI);
            let bin = ((turn * ORIENTATION_BINS as f32) as usize).min(ORIENTATION_BINS - 1);

            let cell_x = ((dx + half) / CELL_SIZE) as usize;
            let cell_y = ((dy + half) / CELL_SIZE) as usize;
            descriptor[(cell_y * CELL_GRID + cell_x) * ORIENTATION_BINS + bin] += magnitude;
        }
    }

    let norm = descriptor.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in descriptor.iter_mut() {
            *value /= norm;
        }
    }
    descriptor
}

fn euclidean(a: &GradientDescriptor, b: &GradientDescriptor) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(x - y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// SIFT-style matcher
#[derive(Default, Debug)]
pub struct SiftMatcher;

impl SimilarityAlgorithm for SiftMatcher {
    fn score(&self, left: &GrayImage, right: &GrayImage) -> Option<f64> {
        let left_descriptors: Vec<GradientDescriptor> = detect_keypoints(left)
            .iter()
            .map(|corner| describe(left, corner))
            .collect();
        let right_descriptors: Vec<GradientDescriptor> = detect_keypoints(right)
            .iter()
            .map(|corner| describe(right, corner))
            .collect();

        let matches = ratio_matches(&left_descriptors, &right_descriptors, euclidean);
        ratio_score(matches, left_descriptors.len(), right_descriptors.len())
    }

    fn kind(&self) -> SimilarityKind {
        SimilarityKind::Sift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn speckle(width: u32, height: u32, salt: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let mut v = (x.wrapping_mul(73_856_093))
                ^ (y.wrapping_mul(19_349_663))
                ^ salt.wrapping_mul(83_492_791);
            v ^= v >> 13;
            v = v.wrapping_mul(2_654_435_761);
            v ^= v >> 16;
            if v % 3 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn descriptor_is_normalized() {
        let image = speckle(64, 64, 9);
        let keypoints = detect_keypoints(&image);
        if let Some(corner) = keypoints.first() {
            let descriptor = describe(&image, corner);
            let norm = descriptor.iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn flat_patch_descriptor_is_all_zero() {
        let image = GrayImage::from_pixel(64, 64, Luma([128]));
        let corner = Corner::new(32, 32, 0.0);
        let descriptor = describe(&image, &corner);
        assert!(descriptor.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn score_is_bounded_when_keypoints_exist() {
        let left = speckle(96, 96, 3);
        let right = speckle(96, 96, 4);

        if let Some(score) = SiftMatcher.score(&left, &right) {
            assert!((0.0..=1.0).contains(&score), "score {score} out of bounds");
        }
    }

    #[test]
    fn blank_images_yield_no_score() {
        let blank = GrayImage::from_pixel(96, 96, Luma([0]));
        assert_eq!(SiftMatcher.score(&blank, &blank), None);
    }
}
