//! Frame helpers shared by the analysis stages.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};

/// Downscale a frame to a small luma plane.
///
/// All frame-difference math in the engine runs on these small planes; the
/// target size is an analysis knob, not a rendering concern.
pub fn downscale_luma(frame: &DynamicImage, width: u32, height: u32) -> GrayImage {
    image::imageops::resize(&frame.to_luma8(), width, height, FilterType::Triangle)
}

/// Mean absolute pixel difference between two equally sized luma planes,
/// on the 0-255 scale.
///
/// Planes of mismatched dimensions compare over the overlapping region.
pub fn mean_abs_diff(a: &GrayImage, b: &GrayImage) -> f64 {
    let width = a.width().min(b.width());
    let height = a.height().min(b.height());
    let count = (width as u64) * (height as u64);
    if count == 0 {
        return 0.0;
    }

    let mut total: u64 = 0;
    for y in 0..height {
        for x in 0..width {
            let pa = a.get_pixel(x, y).0[0] as i32;
            let pb = b.get_pixel(x, y).0[0] as i32;
            total += pa.abs_diff(pb) as u64;
        }
    }

    total as f64 / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, RgbImage};

    fn gray(level: u8, w: u32, h: u32) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([level]))
    }

    #[test]
    fn test_identical_planes_have_zero_diff() {
        let a = gray(100, 16, 12);
        let b = gray(100, 16, 12);
        assert_eq!(mean_abs_diff(&a, &b), 0.0);
    }

    #[test]
    fn test_uniform_offset_diff() {
        let a = gray(100, 16, 12);
        let b = gray(140, 16, 12);
        assert_eq!(mean_abs_diff(&a, &b), 40.0);
    }

    #[test]
    fn test_mismatched_dims_use_overlap() {
        let a = gray(0, 16, 12);
        let b = gray(255, 8, 12);
        assert_eq!(mean_abs_diff(&a, &b), 255.0);
    }

    #[test]
    fn test_downscale_luma_dimensions() {
        let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            640,
            480,
            image::Rgb([10, 200, 30]),
        ));
        let small = downscale_luma(&frame, 160, 120);
        assert_eq!(small.dimensions(), (160, 120));
    }
}
