// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// platescan-vision — Plate localisation for the Platescan reader.
//
// Provides the per-image pipeline (grayscale conversion, Gaussian smoothing,
// edge extraction, contour ranking, quadrilateral search, masked cropping)
// and the seam through which the cropped plate reaches a text recogniser.

pub mod detect;
pub mod extract;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;

// Re-export the primary entry points so callers can use `platescan_vision::PlateScanner` etc.
pub use detect::shape::Polygon;
pub use ocr::{PixelBuffer, RecognizerFactory, TextRecognizer, UnavailableFactory, read_text};
pub use pipeline::{PlateLocation, PlateReading, PlateScanner};

#[cfg(feature = "ocr")]
pub use ocr::engine::{OcrsFactory, OcrsRecognizer};
