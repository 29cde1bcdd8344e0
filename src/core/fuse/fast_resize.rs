//! Fast SIMD-accelerated RGB resizing.
//!
//! Uses the fast_image_resize crate, which picks AVX2/NEON kernels at
//! runtime. The fuser only ever resizes the right-hand image down or up
//! to the left-hand image's dimensions, always with the same bilinear
//! filter so that fusing the same pair twice yields identical bytes.

use crate::error::WorkError;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::RgbImage;
use std::path::Path;

/// Resize an RGB image to the given dimensions with a bilinear filter.
pub fn resize_rgb(
    image: &RgbImage,
    width: u32,
    height: u32,
    path: &Path,
) -> Result<RgbImage, WorkError> {
    let src_width = image.width();
    let src_height = image.height();

    if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
        return Err(WorkError::DecodeError {
            path: path.to_path_buf(),
            reason: "Zero-sized image cannot be resized".to_string(),
        });
    }

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        image.as_raw().clone(),
        PixelType::U8x3,
    )
    .map_err(|e| WorkError::DecodeError {
        path: path.to_path_buf(),
        reason: format!("Failed to create source image: {e}"),
    })?;

    let mut dst_image = Image::new(width, height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));

    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| WorkError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("Resize failed: {e}"),
        })?;

    RgbImage::from_raw(width, height, dst_image.into_vec()).ok_or_else(|| {
        WorkError::DecodeError {
            path: path.to_path_buf(),
            reason: "Failed to create result buffer".to_string(),
        }
    })
}
