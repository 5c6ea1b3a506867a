// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Platescan.

use thiserror::Error;

/// Top-level error type for all Platescan operations.
#[derive(Debug, Error)]
pub enum PlateScanError {
    // -- Input errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("invalid input image: {0}")]
    InvalidInput(String),

    #[error("invalid pipeline parameter: {0}")]
    InvalidParameter(String),

    // -- Detection --
    #[error("no plate-shaped region found")]
    NoPlateFound,

    // -- Text recognition --
    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("pixel buffer allocation failed for {width}x{height}")]
    BufferAllocation { width: u32, height: u32 },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PlateScanError>;
