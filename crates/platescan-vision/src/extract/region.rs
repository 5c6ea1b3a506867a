// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Masked crop of the selected plate polygon.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use platescan_core::error::{PlateScanError, Result};
use tracing::{debug, info, instrument};

use crate::detect::shape::Polygon;

/// Rasterise `polygon` into a `width` x `height` mask: 255 inside and on the
/// outline, 0 elsewhere.
pub fn polygon_mask(width: u32, height: u32, polygon: &Polygon) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let fill = Luma([255u8]);

    // The filler rejects an explicitly closed ring.
    let mut points: Vec<Point<i32>> = polygon.points().to_vec();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    match points.as_slice() {
        [] => {}
        [only] => {
            if only.x >= 0 && only.y >= 0 && (only.x as u32) < width && (only.y as u32) < height {
                mask.put_pixel(only.x as u32, only.y as u32, fill);
            }
        }
        [a, b] => draw_line_segment_mut(
            &mut mask,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            fill,
        ),
        _ => draw_polygon_mut(&mut mask, &points, fill),
    }
    mask
}

/// Copy the pixels of `src` inside `polygon` and crop to its bounding box.
///
/// Pixels inside the box but outside the polygon are black. An empty polygon
/// means no plate was found upstream and yields [`PlateScanError::NoPlateFound`];
/// a polygon lying entirely outside the image is [`PlateScanError::InvalidInput`].
#[instrument(skip_all, fields(width = src.width(), height = src.height(), vertices = polygon.len()))]
pub fn extract_region(src: &RgbImage, polygon: &Polygon) -> Result<RgbImage> {
    let bounds = polygon.bounding_rect().ok_or(PlateScanError::NoPlateFound)?;
    let (width, height) = src.dimensions();
    let crop = bounds.clamp_to(width, height).ok_or_else(|| {
        PlateScanError::InvalidInput(format!(
            "plate outline {bounds} lies outside the {width}x{height} image"
        ))
    })?;

    let mask = polygon_mask(width, height, polygon);
    let mut masked = RgbImage::new(width, height);
    for ((out, pixel), m) in masked.pixels_mut().zip(src.pixels()).zip(mask.pixels()) {
        *out = if m.0[0] != 0 { *pixel } else { Rgb([0, 0, 0]) };
    }
    debug!(%bounds, crop_area = crop.area(), "Mask applied");

    let plate = image::imageops::crop_imm(
        &masked,
        crop.x as u32,
        crop.y as u32,
        crop.width,
        crop.height,
    )
    .to_image();

    info!(
        crop_w = plate.width(),
        crop_h = plate.height(),
        "Plate region extracted"
    );
    Ok(plate)
}
