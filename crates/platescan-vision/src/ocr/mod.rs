// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition seam.
//
// The pipeline hands the cropped plate to a recogniser as a single-channel
// 8-bit buffer with an explicit stride. A fresh engine is created for every
// call and released when it goes out of scope, whichever way the call ends.
// Every failure degrades to an empty string plus a logged diagnostic.
//
// The `ocrs`-backed engine lives in `engine` behind the `ocr` feature.

#[cfg(feature = "ocr")]
pub mod engine;

use image::GrayImage;
use platescan_core::error::{PlateScanError, Result};
use tracing::{debug, info, instrument, warn};

/// Rows are padded to a multiple of this many bytes.
const ROW_ALIGN: usize = 4;

/// Single-channel 8-bit pixel buffer with word-aligned rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    /// Bytes per row, `>= width`.
    stride: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Copy `image` into a freshly allocated buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PlateScanError::BufferAllocation`] if the buffer size
    /// overflows or the allocation is refused.
    pub fn from_gray(image: &GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let alloc_err = || PlateScanError::BufferAllocation { width, height };

        let stride = (width as usize)
            .checked_next_multiple_of(ROW_ALIGN)
            .ok_or_else(alloc_err)?;
        let len = stride.checked_mul(height as usize).ok_or_else(alloc_err)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| alloc_err())?;

        if width > 0 {
            let padding = stride - width as usize;
            for row in image.as_raw().chunks_exact(width as usize) {
                data.extend_from_slice(row);
                data.extend(std::iter::repeat_n(0u8, padding));
            }
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw bytes, `stride * height` long, padding included.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The `width` meaningful bytes of row `y`, `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        self.data().get(start..start + self.width as usize)
    }

    /// Repack into a tightly strided image.
    pub fn to_gray_image(&self) -> GrayImage {
        let packed: Vec<u8> = (0..self.height)
            .filter_map(|y| self.row(y))
            .flatten()
            .copied()
            .collect();
        GrayImage::from_raw(self.width, self.height, packed)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

/// A text recogniser instance. Dropping it releases the engine.
pub trait TextRecognizer {
    /// Recognise the text in `buffer`.
    fn recognize(&mut self, buffer: &PixelBuffer) -> Result<String>;
}

/// Creates one recogniser per plate.
pub trait RecognizerFactory {
    type Engine: TextRecognizer;

    /// Initialise a new engine instance.
    fn create(&self) -> Result<Self::Engine>;
}

/// Read the text on a grayscale plate crop.
///
/// Empty and all-black crops are treated as "nothing to read" and return an
/// empty string without starting an engine. Engine initialisation, buffer
/// allocation, and recognition failures are logged and also return an empty
/// string; the engine is dropped on every path.
#[instrument(skip_all, fields(width = plate.width(), height = plate.height()))]
pub fn read_text<F: RecognizerFactory>(factory: &F, plate: &GrayImage) -> String {
    if plate.width() == 0 || plate.height() == 0 {
        info!("Empty plate region; skipping OCR");
        return String::new();
    }
    if plate.pixels().all(|p| p.0[0] == 0) {
        info!("Blank plate region; skipping OCR");
        return String::new();
    }

    let mut engine = match factory.create() {
        Ok(engine) => engine,
        Err(err) => {
            warn!(error = %err, "Could not initialise OCR engine");
            return String::new();
        }
    };

    let buffer = match PixelBuffer::from_gray(plate) {
        Ok(buffer) => buffer,
        Err(err) => {
            warn!(error = %err, "Could not create OCR pixel buffer");
            return String::new();
        }
    };

    match engine.recognize(&buffer) {
        Ok(text) => {
            debug!(chars = text.chars().count(), "OCR text extracted");
            text
        }
        Err(err) => {
            warn!(error = %err, "Failed to get OCR text");
            String::new()
        }
    }
}

/// Recogniser that can never be constructed.
#[derive(Debug)]
pub enum NoEngine {}

impl TextRecognizer for NoEngine {
    fn recognize(&mut self, _buffer: &PixelBuffer) -> Result<String> {
        match *self {}
    }
}

/// Factory used when the crate is built without an OCR backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableFactory;

impl RecognizerFactory for UnavailableFactory {
    type Engine = NoEngine;

    fn create(&self) -> Result<NoEngine> {
        Err(PlateScanError::OcrError(
            "built without OCR support; enable the `ocr` feature".into(),
        ))
    }
}
