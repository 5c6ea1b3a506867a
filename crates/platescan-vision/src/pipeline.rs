// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-image plate pipeline.
//
// image -> gray -> smoothed -> edges -> ranked borders -> quad -> masked crop -> OCR
//
// Each stage consumes the previous stage's output and hands its own result
// on. Nothing is cached between images.

use std::path::Path;

use image::{GrayImage, RgbImage};
use platescan_core::config::PipelineConfig;
use platescan_core::error::{PlateScanError, Result};
use platescan_core::types::BoundingRect;
use tracing::{debug, info, instrument, warn};

use crate::detect::{detect_edges, find_boundaries, rank_by_area, select_quad};
use crate::detect::shape::Polygon;
use crate::extract::extract_region;
use crate::ocr::{RecognizerFactory, read_text};
use crate::preprocess::{color_to_gray, smooth};

/// Where the plate outline was found, if anywhere.
#[derive(Debug, Clone)]
pub struct PlateLocation {
    /// Selected outline, `None` when no border simplified to a quad.
    pub polygon: Option<Polygon>,
    /// Rank of the selected border in the area ordering.
    pub rank: Option<usize>,
    /// Number of borders traced in the edge map.
    pub border_count: usize,
    /// The noise-reduced intensity image the edges were taken from.
    pub smoothed: GrayImage,
}

/// Outcome of reading one image.
#[derive(Debug, Clone)]
pub struct PlateReading {
    /// Recognised text, empty when nothing could be read.
    pub text: String,
    pub polygon: Option<Polygon>,
    pub bounds: Option<BoundingRect>,
    /// Masked colour crop handed to OCR.
    pub plate: Option<RgbImage>,
    pub smoothed: GrayImage,
}

/// Locates, crops, and reads licence plates with a fixed configuration.
#[derive(Debug, Clone)]
pub struct PlateScanner {
    config: PipelineConfig,
}

impl PlateScanner {
    /// Create a scanner, rejecting unusable parameters up front.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode an image file to 8-bit RGB.
    ///
    /// # Errors
    ///
    /// [`PlateScanError::ImageError`] if the file cannot be decoded and
    /// [`PlateScanError::InvalidInput`] if it decodes to zero pixels.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage> {
        let image = image::open(path.as_ref()).map_err(|err| {
            PlateScanError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = image.width(), height = image.height(), "Image loaded");

        let rgb = image.to_rgb8();
        ensure_not_empty(&rgb)?;
        Ok(rgb)
    }

    /// Run every stage up to the quadrilateral search.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn locate(&self, image: &RgbImage) -> Result<PlateLocation> {
        ensure_not_empty(image)?;

        let gray = color_to_gray(image);
        let smoothed = smooth(&gray, &self.config.smoothing)?;
        let edges = detect_edges(&smoothed, &self.config.edges)?;
        let ranked = rank_by_area(find_boundaries(&edges));
        let border_count = ranked.len();
        debug!(border_count, "Borders ranked");

        let found = select_quad(&ranked, &self.config.shape);
        let (polygon, rank) = match found {
            Some(m) => (Some(m.polygon), Some(m.rank)),
            None => (None, None),
        };

        Ok(PlateLocation {
            polygon,
            rank,
            border_count,
            smoothed,
        })
    }

    /// Crop the located plate out of the colour source.
    pub fn extract(&self, image: &RgbImage, location: &PlateLocation) -> Result<RgbImage> {
        match &location.polygon {
            Some(polygon) => extract_region(image, polygon),
            None => Err(PlateScanError::NoPlateFound),
        }
    }

    /// Locate, crop, and read the plate in a decoded image.
    ///
    /// A missing plate is not an error: the reading comes back with empty
    /// text and no polygon.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn scan_image<F: RecognizerFactory>(&self, image: &RgbImage, factory: &F) -> Result<PlateReading> {
        let location = self.locate(image)?;

        let plate = match self.extract(image, &location) {
            Ok(plate) => Some(plate),
            Err(PlateScanError::NoPlateFound) => {
                warn!(borders = location.border_count, "No plate found");
                None
            }
            Err(err) => return Err(err),
        };

        let text = match &plate {
            Some(plate) => read_text(factory, &color_to_gray(plate)),
            None => String::new(),
        };

        let bounds = location.polygon.as_ref().and_then(Polygon::bounding_rect);
        info!(
            found = plate.is_some(),
            chars = text.chars().count(),
            "Plate scan complete"
        );
        Ok(PlateReading {
            text,
            polygon: location.polygon,
            bounds,
            plate,
            smoothed: location.smoothed,
        })
    }

    /// Decode `path` and scan it.
    pub fn scan_path<F: RecognizerFactory>(
        &self,
        path: impl AsRef<Path>,
        factory: &F,
    ) -> Result<PlateReading> {
        let image = Self::load_image(path)?;
        self.scan_image(&image, factory)
    }
}

fn ensure_not_empty(image: &RgbImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PlateScanError::InvalidInput(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}
