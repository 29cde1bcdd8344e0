//! Whole-image template matching.
//!
//! Runs a normalized squared-difference template match at zero offset:
//! both inputs share dimensions, so the match produces a single cell
//! whose value is sum((a-b)^2) / sqrt(sum(a^2) * sum(b^2)). The score
//! is one minus that value, making identical inputs score exactly 1.0.

use super::super::{SimilarityAlgorithm, SimilarityKind};
use image::GrayImage;
use imageproc::template_matching::{match_template, MatchTemplateMethod};

/// Normalized squared-difference matcher
#[derive(Debug)]
pub struct TemplateMatcher;

impl SimilarityAlgorithm for TemplateMatcher {
    fn score(&self, left: &GrayImage, right: &GrayImage) -> Option<f64> {
        if left.dimensions() != right.dimensions() {
            tracing::debug!(
                "template match skipped: dimensions {:?} vs {:?}",
                left.dimensions(),
                right.dimensions()
            );
            return None;
        }
        if left.width() == 0 || left.height() == 0 {
            return None;
        }

        let result = match_template(
            left,
            right,
            MatchTemplateMethod::SumOfSquaredErrorsNormalized,
        );
        let normalized = f64::from(result.get_pixel(0, 0)[0]);
        if !normalized.is_finite() {
            // Both images all-black: the normalization term is zero
            return None;
        }

        Some(1.0 - normalized)
    }

    fn kind(&self) -> SimilarityKind {
        SimilarityKind::TemplateMatch
    }
}
