// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binary edge map from the smoothed intensity image.

use image::GrayImage;
use imageproc::edges::canny;
use platescan_core::config::EdgeConfig;
use platescan_core::error::{PlateScanError, Result};
use tracing::{debug, instrument};

/// Run Canny edge detection with hysteresis thresholds from `config`.
///
/// Output pixels are 255 on an edge and 0 elsewhere. Weak responses above
/// `low_threshold` survive only when connected to a response above
/// `high_threshold`.
#[instrument(skip_all, fields(
    width = src.width(),
    height = src.height(),
    low = config.low_threshold,
    high = config.high_threshold,
))]
pub fn detect_edges(src: &GrayImage, config: &EdgeConfig) -> Result<GrayImage> {
    if config.low_threshold >= config.high_threshold {
        return Err(PlateScanError::InvalidParameter(format!(
            "low edge threshold ({}) must be below high threshold ({})",
            config.low_threshold, config.high_threshold
        )));
    }
    if src.width() == 0 || src.height() == 0 {
        return Ok(GrayImage::new(src.width(), src.height()));
    }

    let edges = canny(src, config.low_threshold, config.high_threshold);

    let edge_pixels = edges.pixels().filter(|p| p.0[0] != 0).count();
    debug!(edge_pixels, "Canny edge detection complete");
    Ok(edges)
}
