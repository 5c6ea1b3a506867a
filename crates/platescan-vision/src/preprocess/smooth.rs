// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gaussian smoothing applied before edge extraction.
//
// The kernel is a raw (unnormalised) sampled 2D Gaussian. Normalisation
// happens inside the convolution loop, either after every tap or once per
// window, see `Normalization`. Pixels closer than half a kernel width to the
// image border are copied through untouched.

use image::GrayImage;
use platescan_core::config::{MAX_SIGMA, SmoothingConfig};
use platescan_core::error::{PlateScanError, Result};
use platescan_core::types::Normalization;
use tracing::{debug, info, instrument};

/// Square Gaussian kernel sampled on an odd-sized grid.
#[derive(Debug, Clone)]
pub struct GaussianKernel {
    /// Side length in taps (always odd).
    size: usize,
    /// Row-major weights, `size * size` entries.
    weights: Vec<f32>,
    /// Sum of the raw weights. Not necessarily 1.
    sum: f32,
}

impl GaussianKernel {
    /// Build the kernel for `sigma`.
    ///
    /// The side length is `ceil(6 * sigma)`, bumped to the next odd number
    /// when even. Weights are `1 / (2 pi sigma^2) * exp(-(dx^2 + dy^2) / (2 sigma^2))`
    /// sampled at integer offsets from the centre tap.
    pub fn new(sigma: f32) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 || sigma > MAX_SIGMA {
            return Err(PlateScanError::InvalidParameter(format!(
                "smoothing sigma must be in (0, {MAX_SIGMA}], got {sigma}"
            )));
        }

        let mut size = (sigma * 6.0).ceil() as usize;
        if size % 2 == 0 {
            size += 1;
        }
        let taps = size.checked_mul(size).ok_or_else(|| {
            PlateScanError::InvalidParameter(format!("kernel of side {size} is too large"))
        })?;

        let center = (size / 2) as i64;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let scale = (1.0 / (2.0 * std::f64::consts::PI * sigma as f64 * sigma as f64)) as f32;

        let mut weights = Vec::with_capacity(taps);
        let mut sum = 0.0f32;
        for row in 0..size as i64 {
            for col in 0..size as i64 {
                let dist_sq = ((row - center).pow(2) + (col - center).pow(2)) as f32;
                let weight = scale * (-dist_sq / two_sigma_sq).exp();
                weights.push(weight);
                sum += weight;
            }
        }

        Ok(Self { size, weights, sum })
    }

    /// Side length in taps.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Half the side length, rounded down. Also the width of the untouched border.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Raw weight sum used as the normalisation divisor.
    pub fn sum(&self) -> f32 {
        self.sum
    }

    /// Weight at (`row`, `col`) of the kernel grid.
    pub fn weight(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.size + col]
    }
}

/// Smooth a single-channel image with the configured Gaussian.
///
/// The output has the same dimensions as `src`. The border band of
/// `kernel.radius()` pixels is byte-identical to the input; images too small
/// to have an interior are returned unchanged.
#[instrument(skip_all, fields(
    width = src.width(),
    height = src.height(),
    sigma = config.sigma,
    normalization = ?config.normalization,
))]
pub fn smooth(src: &GrayImage, config: &SmoothingConfig) -> Result<GrayImage> {
    let kernel = GaussianKernel::new(config.sigma)?;
    debug!(
        size = kernel.size(),
        sum = kernel.sum(),
        "Gaussian kernel built"
    );

    let out = convolve(src, &kernel, config.normalization);
    info!(kernel_size = kernel.size(), "Smoothing complete");
    Ok(out)
}

/// Convolve the interior of `src` with `kernel`.
///
/// Reads only from `src`, so every output pixel sees the unfiltered
/// neighbourhood.
pub fn convolve(src: &GrayImage, kernel: &GaussianKernel, normalization: Normalization) -> GrayImage {
    let (width, height) = (src.width() as usize, src.height() as usize);
    let radius = kernel.radius();
    let size = kernel.size();
    let divisor = kernel.sum();

    let input = src.as_raw();
    let mut output = input.clone();

    for y in radius..height.saturating_sub(radius) {
        for x in radius..width.saturating_sub(radius) {
            let mut acc = 0.0f32;
            for k in 0..size {
                let row = (y + k - radius) * width;
                for l in 0..size {
                    let sample = input[row + x + l - radius] as f32;
                    acc += sample * kernel.weight(k, l);
                    if normalization == Normalization::PerTap {
                        acc /= divisor;
                    }
                }
            }
            if normalization == Normalization::Final {
                acc /= divisor;
            }
            output[y * width + x] = saturate(acc);
        }
    }

    // Same dimensions as the input buffer, so construction cannot fail.
    GrayImage::from_raw(src.width(), src.height(), output).unwrap_or_else(|| src.clone())
}

/// Round to nearest and clamp into the 8-bit range.
fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn per_tap() -> SmoothingConfig {
        SmoothingConfig::default()
    }

    fn final_division() -> SmoothingConfig {
        SmoothingConfig {
            normalization: Normalization::Final,
            ..SmoothingConfig::default()
        }
    }

    /// Value a flat window of `v` produces under per-tap division, computed
    /// tap by tap in kernel order.
    fn per_tap_flat_response(kernel: &GaussianKernel, v: u8) -> u8 {
        let mut acc = 0.0f32;
        for k in 0..kernel.size() {
            for l in 0..kernel.size() {
                acc += v as f32 * kernel.weight(k, l);
                acc /= kernel.sum();
            }
        }
        saturate(acc)
    }

    fn textured(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 37 + y * 91 + x * y) % 256) as u8]))
    }

    #[test]
    fn kernel_size_is_odd_ceil_of_six_sigma() {
        assert_eq!(GaussianKernel::new(0.8).unwrap().size(), 5);
        // 6.0 is even, bumped to 7
        assert_eq!(GaussianKernel::new(1.0).unwrap().size(), 7);
        assert_eq!(GaussianKernel::new(1.2).unwrap().size(), 9);
    }

    #[test]
    fn larger_sigma_grows_the_kernel() {
        let kernel = GaussianKernel::new(4.0).unwrap();
        assert_eq!(kernel.size(), 25);
        assert_eq!(kernel.radius(), 12);
    }

    #[test]
    fn kernel_sum_is_raw_sample_total() {
        let kernel = GaussianKernel::new(0.8).unwrap();
        let total: f32 = (0..5)
            .flat_map(|k| (0..5).map(move |l| (k, l)))
            .map(|(k, l)| kernel.weight(k, l))
            .sum();
        assert!((kernel.sum() - total).abs() < 1e-5);
        // Sampled, not renormalised: just under 1 for sigma 0.8.
        assert!(kernel.sum() < 1.0 && kernel.sum() > 0.99, "sum = {}", kernel.sum());
        // Symmetric about the centre tap.
        assert_eq!(kernel.weight(0, 1), kernel.weight(1, 0));
        assert_eq!(kernel.weight(0, 0), kernel.weight(4, 4));
        assert!(kernel.weight(2, 2) > kernel.weight(2, 3));
    }

    #[test]
    fn invalid_sigma_is_rejected() {
        assert!(GaussianKernel::new(0.0).is_err());
        assert!(GaussianKernel::new(-1.0).is_err());
        assert!(GaussianKernel::new(f32::INFINITY).is_err());
    }

    #[test]
    fn oversized_sigma_is_rejected_before_allocating() {
        assert_eq!(GaussianKernel::new(MAX_SIGMA).unwrap().size(), 97);
        for sigma in [MAX_SIGMA + 0.5, 1.0e10, f32::MAX] {
            assert!(matches!(
                GaussianKernel::new(sigma),
                Err(PlateScanError::InvalidParameter(_))
            ));
        }

        let config = SmoothingConfig {
            sigma: 1.0e10,
            ..SmoothingConfig::default()
        };
        let src = GrayImage::from_pixel(8, 8, Luma([50u8]));
        assert!(smooth(&src, &config).is_err());
    }

    #[test]
    fn per_tap_flat_interior_matches_direct_computation() {
        let kernel = GaussianKernel::new(0.8).unwrap();
        for v in [0u8, 20, 100, 200, 250] {
            let src = GrayImage::from_pixel(20, 15, Luma([v]));
            let out = smooth(&src, &per_tap()).unwrap();
            let expected = per_tap_flat_response(&kernel, v);
            for y in 2..13 {
                for x in 2..18 {
                    assert_eq!(out.get_pixel(x, y).0[0], expected, "v={v} at ({x}, {y})");
                }
            }
        }
    }

    /// Side-by-side fixture for the two normalisation placements. Per-tap
    /// division brightens a flat field by about 2% with sigma 0.8 and clips
    /// near white; a single final division reproduces the field exactly.
    #[test]
    fn per_tap_and_final_division_differ_on_flat_fields() {
        let src = GrayImage::from_pixel(12, 12, Luma([200u8]));
        let per_tap_out = smooth(&src, &per_tap()).unwrap();
        let final_out = smooth(&src, &final_division()).unwrap();

        assert_eq!(per_tap_out.get_pixel(6, 6).0[0], 204);
        assert_eq!(final_out.get_pixel(6, 6).0[0], 200);

        let bright = GrayImage::from_pixel(12, 12, Luma([250u8]));
        assert_eq!(smooth(&bright, &per_tap()).unwrap().get_pixel(6, 6).0[0], 255);
        assert_eq!(smooth(&bright, &final_division()).unwrap().get_pixel(6, 6).0[0], 250);
    }

    #[test]
    fn final_division_preserves_any_flat_value() {
        for v in [0u8, 1, 37, 128, 254, 255] {
            let src = GrayImage::from_pixel(9, 9, Luma([v]));
            let out = smooth(&src, &final_division()).unwrap();
            assert!(out.pixels().all(|p| p.0[0] == v), "v={v}");
        }
    }

    #[test]
    fn border_band_is_byte_identical() {
        let src = textured(31, 23);
        let out = smooth(&src, &per_tap()).unwrap();
        let radius = 2;
        for (x, y, pixel) in out.enumerate_pixels() {
            let in_border = x < radius || y < radius || x >= 31 - radius || y >= 23 - radius;
            if in_border {
                assert_eq!(pixel, src.get_pixel(x, y), "border pixel ({x}, {y}) changed");
            }
        }
    }

    #[test]
    fn interior_reads_unfiltered_neighbours() {
        // A single bright pixel spreads into its whole window, which would not
        // happen symmetrically if already-filtered output were read back.
        let mut src = GrayImage::new(11, 11);
        src.put_pixel(5, 5, Luma([255]));
        let out = smooth(&src, &final_division()).unwrap();
        assert_eq!(out.get_pixel(4, 5), out.get_pixel(6, 5));
        assert_eq!(out.get_pixel(5, 4), out.get_pixel(5, 6));
        assert!(out.get_pixel(5, 5).0[0] > out.get_pixel(4, 5).0[0]);
    }

    #[test]
    fn image_smaller_than_kernel_passes_through() {
        let src = textured(4, 3);
        let out = smooth(&src, &per_tap()).unwrap();
        assert_eq!(out, src);

        let empty = GrayImage::new(0, 0);
        assert_eq!(smooth(&empty, &per_tap()).unwrap().dimensions(), (0, 0));
    }

    #[test]
    fn smoothing_is_deterministic() {
        let src = textured(40, 30);
        let a = smooth(&src, &per_tap()).unwrap();
        let b = smooth(&src, &per_tap()).unwrap();
        assert_eq!(a, b);
    }
}
