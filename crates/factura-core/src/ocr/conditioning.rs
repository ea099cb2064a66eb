//! Image conditioning ahead of OCR: binarization, denoising, contrast,
//! and skew correction.

use image::{imageops, DynamicImage, GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::hough::{detect_lines, LineDetectionOptions};
use tracing::debug;

use crate::models::config::ConditioningConfig;

// PIL-style sharpening kernel, normalized to unit gain.
const SHARPEN_KERNEL: [f32; 9] = [
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    32.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
];

// Below this edge length there is nothing useful to condition.
const MIN_DIMENSION: u32 = 32;

/// Conditions a raster page for text recognition.
///
/// Conditioning is best-effort: a page the conditioner cannot improve
/// (degenerate dimensions, no detectable structure) passes through as
/// plain luminance, and the pipeline continues.
pub struct ImageConditioner {
    config: ConditioningConfig,
}

impl ImageConditioner {
    /// Create a conditioner with default settings.
    pub fn new() -> Self {
        Self {
            config: ConditioningConfig::default(),
        }
    }

    /// Create a conditioner from configuration.
    pub fn from_config(config: &ConditioningConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Condition a page: luminance, binarization, denoise, contrast,
    /// sharpen, then deskew.
    pub fn condition(&self, page: &DynamicImage) -> GrayImage {
        let gray = page.to_luma8();

        let (width, height) = gray.dimensions();
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            debug!("page too small to condition ({}x{})", width, height);
            return gray;
        }

        let enhanced = self.enhance(&gray);
        self.deskew(&enhanced)
    }

    /// Flatten lighting and boost stroke contrast.
    fn enhance(&self, gray: &GrayImage) -> GrayImage {
        let blurred = gaussian_blur_f32(gray, self.config.blur_sigma);
        let binary = self.adaptive_threshold(
            &blurred,
            self.config.threshold_block_size,
            self.config.threshold_offset,
        );
        let denoised = median_filter(&binary, 1, 1);
        let boosted = self.boost_contrast(&denoised, self.config.contrast_factor);
        imageops::filter3x3(&boosted, &SHARPEN_KERNEL)
    }

    /// Straighten the page if the dominant text angle exceeds the
    /// configured threshold. Without any detected line the page is
    /// returned unrotated.
    pub fn deskew(&self, gray: &GrayImage) -> GrayImage {
        match self.estimate_skew(gray) {
            Some(angle) if angle.abs() > self.config.skew_threshold_degrees => {
                debug!("correcting skew of {:.2} degrees", angle);
                self.rotate_about_center(gray, -angle)
            }
            _ => gray.clone(),
        }
    }

    /// Estimate the page skew in degrees.
    ///
    /// Edge-detects the page, finds lines with a Hough transform and
    /// takes the median deviation from horizontal across all
    /// near-horizontal lines. The median holds up against outlier
    /// segments (table borders, logos) that would drag a mean.
    pub fn estimate_skew(&self, gray: &GrayImage) -> Option<f32> {
        let edges = canny(gray, self.config.canny_low, self.config.canny_high);

        let options = LineDetectionOptions {
            vote_threshold: self.config.hough_vote_threshold,
            suppression_radius: 8,
        };
        let lines = detect_lines(&edges, options);

        // A detected angle is that of the line's normal; deviation from
        // 90 degrees is the line's tilt from horizontal.
        let mut angles: Vec<f32> = lines
            .iter()
            .map(|line| line.angle_in_degrees as f32 - 90.0)
            .filter(|a| a.abs() <= 45.0)
            .collect();

        if angles.is_empty() {
            return None;
        }

        angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = angles.len() / 2;
        let median = if angles.len() % 2 == 0 {
            (angles[mid - 1] + angles[mid]) / 2.0
        } else {
            angles[mid]
        };

        debug!("estimated skew {:.2} degrees from {} lines", median, angles.len());
        Some(median)
    }

    /// Binarize against the local mean over a square block.
    fn adaptive_threshold(&self, image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
        let (width, height) = image.dimensions();
        let mut result = GrayImage::new(width, height);

        let half_block = block_size / 2;

        for y in 0..height {
            for x in 0..width {
                let mut sum = 0u32;
                let mut count = 0u32;

                let y_start = y.saturating_sub(half_block);
                let y_end = (y + half_block + 1).min(height);
                let x_start = x.saturating_sub(half_block);
                let x_end = (x + half_block + 1).min(width);

                for ly in y_start..y_end {
                    for lx in x_start..x_end {
                        sum += image.get_pixel(lx, ly)[0] as u32;
                        count += 1;
                    }
                }

                let mean = (sum / count) as i32;
                let threshold = mean - offset;
                let pixel_value = image.get_pixel(x, y)[0] as i32;

                let output = if pixel_value > threshold { 255 } else { 0 };
                result.put_pixel(x, y, Luma([output]));
            }
        }

        result
    }

    /// Scale pixel values away from the image mean by a fixed factor.
    fn boost_contrast(&self, image: &GrayImage, factor: f32) -> GrayImage {
        let (width, height) = image.dimensions();

        let total: u64 = image.pixels().map(|p| p[0] as u64).sum();
        let mean = total as f32 / (width as u64 * height as u64) as f32;

        let mut result = GrayImage::new(width, height);
        for (x, y, pixel) in image.enumerate_pixels() {
            let value = mean + (pixel[0] as f32 - mean) * factor;
            result.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
        }

        result
    }

    /// Rotate about the image centre with bicubic sampling and
    /// edge-replicated borders.
    fn rotate_about_center(&self, image: &GrayImage, angle_degrees: f32) -> GrayImage {
        let (width, height) = image.dimensions();
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        let (sin, cos) = angle_degrees.to_radians().sin_cos();

        let mut result = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;

                // Inverse mapping back into the source image.
                let sx = cos * dx + sin * dy + cx;
                let sy = -sin * dx + cos * dy + cy;

                result.put_pixel(x, y, Luma([bicubic_sample(image, sx, sy)]));
            }
        }

        result
    }
}

impl Default for ImageConditioner {
    fn default() -> Self {
        Self::new()
    }
}

/// Catmull-Rom cubic kernel.
fn cubic_weight(t: f32) -> f32 {
    let t = t.abs();
    if t <= 1.0 {
        1.5 * t * t * t - 2.5 * t * t + 1.0
    } else if t < 2.0 {
        -0.5 * t * t * t + 2.5 * t * t - 4.0 * t + 2.0
    } else {
        0.0
    }
}

/// Sample a source position bicubically, clamping coordinates so the
/// border replicates outward.
fn bicubic_sample(image: &GrayImage, sx: f32, sy: f32) -> u8 {
    let (width, height) = image.dimensions();
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;

    let mut acc = 0.0f32;
    let mut weight_sum = 0.0f32;

    for j in -1i64..=2 {
        let py = (y0 as i64 + j).clamp(0, height as i64 - 1) as u32;
        let wy = cubic_weight(j as f32 - fy);
        for i in -1i64..=2 {
            let px = (x0 as i64 + i).clamp(0, width as i64 - 1) as u32;
            let w = cubic_weight(i as f32 - fx) * wy;
            acc += w * image.get_pixel(px, py)[0] as f32;
            weight_sum += w;
        }
    }

    (acc / weight_sum).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_line_segment_mut;

    /// White page with dark parallel "text baselines" tilted by the
    /// given angle.
    fn skewed_page(angle_degrees: f32) -> GrayImage {
        let mut image = GrayImage::from_pixel(400, 300, Luma([255u8]));
        let slope = angle_degrees.to_radians().tan();

        for base in [60.0f32, 120.0, 180.0, 240.0] {
            for offset in 0..3 {
                let y0 = base + offset as f32;
                draw_line_segment_mut(
                    &mut image,
                    (20.0, y0),
                    (380.0, y0 + 360.0 * slope),
                    Luma([0u8]),
                );
            }
        }

        image
    }

    #[test]
    fn test_estimate_skew_detects_tilt() {
        let conditioner = ImageConditioner::new();
        let page = skewed_page(3.0);

        let estimate = conditioner.estimate_skew(&page).expect("lines detected");
        assert!(
            (estimate - 3.0).abs() <= 1.5,
            "estimate {} too far from 3.0",
            estimate
        );
    }

    #[test]
    fn test_deskew_reduces_residual_skew() {
        let conditioner = ImageConditioner::new();
        let page = skewed_page(3.0);

        let before = conditioner.estimate_skew(&page).expect("lines detected");
        let corrected = conditioner.deskew(&page);
        let after = conditioner.estimate_skew(&corrected).unwrap_or(0.0);

        assert!(
            after.abs() < before.abs(),
            "residual {} not smaller than {}",
            after,
            before
        );
    }

    #[test]
    fn test_deskew_skips_level_pages() {
        let conditioner = ImageConditioner::new();
        let page = skewed_page(0.0);

        // Below the threshold nothing is rotated; the image comes back
        // bit-identical.
        let out = conditioner.deskew(&page);
        assert_eq!(out.as_raw(), page.as_raw());
    }

    #[test]
    fn test_estimate_skew_featureless_page() {
        let conditioner = ImageConditioner::new();
        let blank = GrayImage::from_pixel(200, 200, Luma([255u8]));
        assert!(conditioner.estimate_skew(&blank).is_none());
    }

    #[test]
    fn test_condition_passes_through_tiny_pages() {
        let conditioner = ImageConditioner::new();
        let tiny = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([128u8])));
        let out = conditioner.condition(&tiny);
        assert_eq!(out.dimensions(), (8, 8));
    }

    #[test]
    fn test_adaptive_threshold_binarizes() {
        let conditioner = ImageConditioner::new();
        let mut image = GrayImage::from_pixel(64, 64, Luma([200u8]));
        for x in 20..44 {
            image.put_pixel(x, 32, Luma([30u8]));
        }

        let binary = conditioner.adaptive_threshold(&image, 11, 2);
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(binary.get_pixel(32, 32)[0], 0);
    }
}
