//! # Similarity Module
//!
//! Produces a single scalar similarity score for a size-matched image
//! pair, using a named algorithm from a fixed registry.
//!
//! ## Supported Algorithms
//! - **match** - normalized squared-difference template match at zero offset
//! - **orb** - binary-descriptor ratio match over FAST keypoints
//! - **sift** - gradient-histogram-descriptor ratio match over FAST keypoints
//! - **fast** - registered stub, always reports no score
//!
//! ## Preprocessing
//! Every algorithm sees the same normalized input: grayscale, a small
//! Gaussian blur, then Otsu binarization. This flattens illumination
//! and scanner-noise differences before any comparison.
//!
//! ## Example
//! ```rust,ignore
//! use image_pair_joiner::core::similarity::{select, preprocess};
//!
//! let algorithm = select("match")?;
//! let score = algorithm.score(&preprocess(&left), &preprocess(&right));
//! ```

pub mod algorithms;

pub use algorithms::{FastStub, OrbMatcher, SiftMatcher, TemplateMatcher};

use crate::error::UnknownAlgorithm;
use image::{GrayImage, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};

/// Blur strength applied before binarization, matching a 5x5 kernel
const BLUR_SIGMA: f32 = 1.1;

/// Available similarity algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimilarityKind {
    /// Template match - whole-image normalized squared difference
    TemplateMatch,
    /// ORB-style binary descriptors with a ratio test
    Orb,
    /// SIFT-style gradient descriptors with a ratio test
    Sift,
    /// FAST keypoint scoring - not implemented, reports no score
    Fast,
}

impl SimilarityKind {
    /// Registry name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            SimilarityKind::TemplateMatch => "match",
            SimilarityKind::Orb => "orb",
            SimilarityKind::Sift => "sift",
            SimilarityKind::Fast => "fast",
        }
    }

    /// All registered algorithm names
    pub fn registry() -> [SimilarityKind; 4] {
        [
            SimilarityKind::TemplateMatch,
            SimilarityKind::Orb,
            SimilarityKind::Sift,
            SimilarityKind::Fast,
        ]
    }
}

impl std::fmt::Display for SimilarityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for SimilarityKind {
    type Err = UnknownAlgorithm;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::registry()
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownAlgorithm {
                name: name.to_string(),
            })
    }
}

/// One scoring algorithm over a preprocessed, size-matched pair.
///
/// `score` returns `None` when the algorithm cannot produce a value
/// for the pair (zero keypoints, degenerate input, or a stub).
pub trait SimilarityAlgorithm: Send + Sync + std::fmt::Debug {
    /// Score two preprocessed images. Both must share dimensions.
    fn score(&self, left: &GrayImage, right: &GrayImage) -> Option<f64>;

    /// Get the algorithm kind
    fn kind(&self) -> SimilarityKind;
}

/// Build the algorithm registered under `name`.
pub fn select(name: &str) -> Result<Box<dyn SimilarityAlgorithm>, UnknownAlgorithm> {
    Ok(build(name.parse()?))
}

/// Build the algorithm for a known kind.
pub fn build(kind: SimilarityKind) -> Box<dyn SimilarityAlgorithm> {
    match kind {
        SimilarityKind::TemplateMatch => Box::new(TemplateMatcher),
        SimilarityKind::Orb => Box::new(OrbMatcher::default()),
        SimilarityKind::Sift => Box::new(SiftMatcher::default()),
        SimilarityKind::Fast => Box::new(FastStub),
    }
}

/// Shared preprocessing: grayscale, blur, Otsu binarization.
pub fn preprocess(image: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
    let level = otsu_level(&blurred);
    threshold(&blurred, level, ThresholdType::Binary)
}

/// Convenience entry point: preprocess both sides and score.
pub fn score_pair(kind: SimilarityKind, left: &RgbImage, right: &RgbImage) -> Option<f64> {
    let algorithm = build(kind);
    algorithm.score(&preprocess(left), &preprocess(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn registry_resolves_every_name() {
        for kind in SimilarityKind::registry() {
            let algorithm = select(kind.name()).unwrap();
            assert_eq!(algorithm.kind(), kind);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let error = select("surf").unwrap_err();
        assert_eq!(error.name, "surf");
    }

    #[test]
    fn preprocess_binarizes() {
        let image = RgbImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([10, 10, 10])
            } else {
                Rgb([240, 240, 240])
            }
        });

        let binary = preprocess(&image);

        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert!(binary.pixels().any(|p| p[0] == 0));
        assert!(binary.pixels().any(|p| p[0] == 255));
    }

    #[test]
    fn identical_pair_scores_full_match() {
        let image = RgbImage::from_fn(64, 64, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgb([20, 20, 20])
            } else {
                Rgb([230, 230, 230])
            }
        });

        let score = score_pair(SimilarityKind::TemplateMatch, &image, &image).unwrap();
        assert_eq!(score, 1.0);
    }
}
