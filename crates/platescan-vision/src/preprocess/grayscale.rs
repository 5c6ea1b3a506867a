// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grayscale conversion by plain channel averaging.

use image::{GrayImage, Luma, RgbImage};
use tracing::{debug, instrument};

/// Reduce a colour image to one intensity channel.
///
/// Every output pixel is `(r + g + b) / 3` with integer division. This is
/// deliberately not a luminance-weighted conversion: the edge thresholds
/// downstream were chosen against plain averages. An empty input gives an
/// empty output.
#[instrument(skip_all, fields(width = src.width(), height = src.height()))]
pub fn color_to_gray(src: &RgbImage) -> GrayImage {
    let (width, height) = src.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (out, pixel) in gray.pixels_mut().zip(src.pixels()) {
        let [r, g, b] = pixel.0;
        let sum = r as u16 + g as u16 + b as u16;
        *out = Luma([(sum / 3) as u8]);
    }

    debug!("Grayscale conversion complete");
    gray
}
