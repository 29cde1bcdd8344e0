//! # Fuse Module
//!
//! Composes two images into one side-by-side canvas.
//!
//! The right-hand image is resized to the left-hand image's dimensions
//! first, so the fused canvas is always `width_a + width_a'` wide -
//! image A at the left origin, resized image B immediately to its
//! right. Source images are never touched; fusion produces a new
//! artifact saved as `<stem>.tif` in the destination directory.

pub mod fast_resize;

use crate::error::WorkError;
use image::{imageops, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Extensions accepted for the left-hand source of a fusion
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["tif", "tiff", "jpg", "png"];

/// Canvas fill behind the placed regions
const CANVAS_FILL: Rgb<u8> = Rgb([250, 250, 250]);

/// The in-memory output of fusing one pair.
///
/// `left` and `right` are kept alongside the canvas because similarity
/// scoring runs on the same size-matched pair the canvas was built
/// from, without decoding the files a second time.
pub struct Fusion {
    /// The side-by-side composition
    pub canvas: RgbImage,
    /// Image A as decoded
    pub left: RgbImage,
    /// Image B, resized to image A's dimensions
    pub right: RgbImage,
}

/// Whether a path's extension is in the fusion allow-list
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|s| *s == e)
        })
        .unwrap_or(false)
}

/// Decode both images and compose them side by side.
pub fn fuse(left_path: &Path, right_path: &Path) -> Result<Fusion, WorkError> {
    if !is_supported(left_path) {
        return Err(WorkError::UnsupportedFormat {
            path: left_path.to_path_buf(),
        });
    }

    let left = decode_rgb(left_path)?;
    let right = decode_rgb(right_path)?;

    let (width, height) = left.dimensions();
    let right = if right.dimensions() == (width, height) {
        right
    } else {
        fast_resize::resize_rgb(&right, width, height, right_path)?
    };

    let mut canvas = RgbImage::from_pixel(width * 2, height, CANVAS_FILL);
    imageops::replace(&mut canvas, &left, 0, 0);
    imageops::replace(&mut canvas, &right, i64::from(width), 0);

    Ok(Fusion {
        canvas,
        left,
        right,
    })
}

/// Save a fused canvas as `<stem of left_path>.tif` in `dest_dir`.
pub fn write_fused(fusion: &Fusion, left_path: &Path, dest_dir: &Path) -> Result<PathBuf, WorkError> {
    let stem = left_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let save_path = dest_dir.join(format!("{stem}.tif"));

    fusion
        .canvas
        .save(&save_path)
        .map_err(|e| WorkError::EncodeError {
            path: save_path.clone(),
            reason: e.to_string(),
        })?;

    tracing::debug!("joined: {}", save_path.display());
    Ok(save_path)
}

fn decode_rgb(path: &Path) -> Result<RgbImage, WorkError> {
    let image = image::open(path).map_err(|e| WorkError::DecodeError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(image.to_rgb8())
}
