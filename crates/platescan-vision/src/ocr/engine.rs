// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `ocrs`-backed plate recogniser.
//
// # Feature Gate
//
// Only available with the `ocr` feature:
//
// ```toml
// platescan-vision = { path = "crates/platescan-vision", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine needs two model files:
//
// - **Detection model** (`text-detection.rten`) — locates text regions in the crop.
// - **Recognition model** (`text-recognition.rten`) — decodes characters from those regions.
//
// Running the `ocrs-cli` tool once downloads both into the default cache:
//   ```sh
//   cargo install ocrs-cli
//   ocrs some-image.png  # downloads models to ~/.cache/ocrs/
//   ```
//
// The default cache directory is `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`).

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use platescan_core::config::OcrSettings;
use platescan_core::error::{PlateScanError, Result};
use rten::Model;
use tracing::{debug, info, instrument};

use super::{PixelBuffer, RecognizerFactory, TextRecognizer};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Default directory for cached OCR model files.
///
/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs` when
/// `XDG_CACHE_HOME` is unset.
pub fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Builds a fresh [`OcrsRecognizer`] for every plate.
///
/// Models are loaded from disk on each [`create`](RecognizerFactory::create)
/// so no engine state survives from one image to the next.
#[derive(Debug, Clone)]
pub struct OcrsFactory {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrsFactory {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrsFactory {
    /// Expects `dir` to contain `text-detection.rten` and `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Use the configured model directory, or the default cache.
    pub fn from_settings(settings: &OcrSettings) -> Self {
        match &settings.model_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::default(),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for (kind, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(PlateScanError::OcrError(format!(
                    "{kind} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

impl RecognizerFactory for OcrsFactory {
    type Engine = OcrsRecognizer;

    #[instrument(skip_all, fields(
        detection = %self.detection_model_path.display(),
        recognition = %self.recognition_model_path.display(),
    ))]
    fn create(&self) -> Result<OcrsRecognizer> {
        self.validate()?;

        debug!("Loading OCR detection model");
        let detection_model = Model::load_file(&self.detection_model_path).map_err(|err| {
            PlateScanError::OcrError(format!(
                "failed to load detection model from {}: {}",
                self.detection_model_path.display(),
                err
            ))
        })?;

        debug!("Loading OCR recognition model");
        let recognition_model = Model::load_file(&self.recognition_model_path).map_err(|err| {
            PlateScanError::OcrError(format!(
                "failed to load recognition model from {}: {}",
                self.recognition_model_path.display(),
                err
            ))
        })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| PlateScanError::OcrError(format!("failed to initialise OCR engine: {}", err)))?;

        info!("OCR engine initialised");
        Ok(OcrsRecognizer { engine })
    }
}

/// One initialised `ocrs` engine. Released on drop.
pub struct OcrsRecognizer {
    engine: OcrsEngine,
}

impl TextRecognizer for OcrsRecognizer {
    #[instrument(skip_all, fields(width = buffer.width(), height = buffer.height(), stride = buffer.stride()))]
    fn recognize(&mut self, buffer: &PixelBuffer) -> Result<String> {
        // ocrs takes interleaved RGB.
        let rgb = DynamicImage::ImageLuma8(buffer.to_gray_image()).to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            PlateScanError::OcrError(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| PlateScanError::OcrError(format!("OCR preprocessing failed: {}", err)))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| PlateScanError::OcrError(format!("OCR text recognition failed: {}", err)))?;

        debug!(lines = text.lines().count(), "OCR recognition complete");
        Ok(text)
    }
}

impl Drop for OcrsRecognizer {
    fn drop(&mut self) {
        debug!("OCR engine released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_factory_points_to_cache_dir() {
        let factory = OcrsFactory::default();
        let det = factory.detection_model_path.to_string_lossy();
        assert!(det.ends_with(DETECTION_MODEL_FILENAME), "got {det}");
        let rec = factory.recognition_model_path.to_string_lossy();
        assert!(rec.ends_with(RECOGNITION_MODEL_FILENAME), "got {rec}");
    }

    #[test]
    fn settings_model_dir_is_used() {
        let settings = OcrSettings {
            model_dir: Some(PathBuf::from("/tmp/plate-models")),
        };
        let factory = OcrsFactory::from_settings(&settings);
        assert_eq!(
            factory.detection_model_path,
            PathBuf::from("/tmp/plate-models/text-detection.rten")
        );
        assert_eq!(
            factory.recognition_model_path,
            PathBuf::from("/tmp/plate-models/text-recognition.rten")
        );
    }

    #[test]
    fn missing_models_fail_creation() {
        let factory = OcrsFactory::from_dir("/nonexistent/path/ocr-models");
        assert!(factory.validate().is_err());
        assert!(matches!(factory.create(), Err(PlateScanError::OcrError(_))));
    }
}
