//! Percentile intensity normalization.
//!
//! Source images arrive from heterogeneous scanners with wildly different
//! intensity ranges. Before tiling, intensities are clipped to a percentile
//! window and rescaled to the full 8-bit range so the inference model sees
//! a standardized distribution.

use super::error::CodecError;
use image::GrayImage;

/// Clips intensities to the `[q1, q2]` percentile range and rescales the
/// result linearly to `0..=255`.
///
/// Percentiles are nearest-rank over the intensity histogram. A constant
/// image (or a degenerate window where both percentiles land on the same
/// intensity) maps to all zeros.
///
/// # Errors
///
/// Returns [`CodecError::Validation`] unless `0 <= q1 < q2 <= 100`.
pub fn normalize(image: &GrayImage, q1: f64, q2: f64) -> Result<GrayImage, CodecError> {
    if !(0.0..=100.0).contains(&q1) || !(0.0..=100.0).contains(&q2) || q1 >= q2 {
        return Err(CodecError::Validation(format!(
            "percentile window must satisfy 0 <= q1 < q2 <= 100, got [{q1}, {q2}]"
        )));
    }

    let histogram = intensity_histogram(image);
    let total = image.as_raw().len() as u64;
    let lo = percentile_value(&histogram, total, q1);
    let hi = percentile_value(&histogram, total, q2);

    if hi <= lo {
        return Ok(GrayImage::new(image.width(), image.height()));
    }

    let scale = 255.0 / f64::from(hi - lo);
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let clipped = pixel.0[0].clamp(lo, hi);
        pixel.0[0] = (f64::from(clipped - lo) * scale).round() as u8;
    }
    Ok(out)
}

fn intensity_histogram(image: &GrayImage) -> [u64; 256] {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }
    histogram
}

/// Nearest-rank percentile: the smallest intensity whose cumulative count
/// reaches `ceil(q / 100 * total)`.
fn percentile_value(histogram: &[u64; 256], total: u64, q: f64) -> u8 {
    let rank = ((q / 100.0) * total as f64).ceil().max(1.0) as u64;
    let mut cumulative = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative >= rank {
            return value as u8;
        }
    }
    255
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_full_window_stretches_range() {
        // two intensities 100 and 150 stretch to 0 and 255
        let image = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 100 } else { 150 }]));
        let out = normalize(&image, 0.0, 100.0).unwrap();
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(9, 0).0[0], 255);
    }

    #[test]
    fn test_outliers_clipped() {
        // mid-gray image split between 100 and 120 with one black and one
        // white outlier; a 5-95 window clips the outliers to the mid-gray
        // extremes and stretches 100..120 to the full range
        let mut image = GrayImage::from_pixel(10, 10, Luma([100]));
        for i in 0..50 {
            image.put_pixel(i % 10, i / 10, Luma([120]));
        }
        image.put_pixel(0, 0, Luma([0]));
        image.put_pixel(9, 9, Luma([255]));

        let out = normalize(&image, 5.0, 95.0).unwrap();
        // the black outlier clips to the low percentile (100) -> 0
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        // the white outlier clips to the high percentile (120) -> 255
        assert_eq!(out.get_pixel(9, 9).0[0], 255);
        // interior values land on the window edges
        assert_eq!(out.get_pixel(5, 5).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_constant_image_maps_to_zero() {
        let image = GrayImage::from_pixel(8, 8, Luma([77]));
        let out = normalize(&image, 1.0, 99.0).unwrap();
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_invalid_window_rejected() {
        let image = GrayImage::new(4, 4);
        assert!(normalize(&image, 99.0, 1.0).is_err());
        assert!(normalize(&image, -1.0, 50.0).is_err());
        assert!(normalize(&image, 1.0, 101.0).is_err());
        assert!(normalize(&image, 50.0, 50.0).is_err());
    }

    #[test]
    fn test_output_dimensions_preserved() {
        let image = GrayImage::from_fn(13, 7, |x, y| Luma([(x * y % 256) as u8]));
        let out = normalize(&image, 1.0, 99.0).unwrap();
        assert_eq!(out.dimensions(), image.dimensions());
    }
}
