// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlateScanError, Result};
use crate::types::Normalization;

/// Largest accepted smoothing sigma. Keeps the kernel at most 97 taps wide.
pub const MAX_SIGMA: f32 = 16.0;

/// Settings for the noise-reduction pre-step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Gaussian radius. The kernel is `ceil(6 * sigma)` wide, rounded up to odd.
    pub sigma: f32,
    /// Where the kernel-sum division happens.
    pub normalization: Normalization,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            sigma: 0.8,
            normalization: Normalization::PerTap,
        }
    }
}

/// Hysteresis thresholds for the edge detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            low_threshold: 30.0,
            high_threshold: 200.0,
        }
    }
}

/// Polygon approximation policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Approximation tolerance as a fraction of the closed contour perimeter.
    pub epsilon_ratio: f64,
    /// Vertex count a polygon must have to be accepted as a plate.
    pub vertex_count: usize,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            epsilon_ratio: 0.02,
            vertex_count: 4,
        }
    }
}

/// Text recognition settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Directory holding the detection and recognition models.
    /// `None` means the default model cache.
    pub model_dir: Option<PathBuf>,
}

/// Full pipeline configuration. The defaults reproduce the reference detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub smoothing: SmoothingConfig,
    pub edges: EdgeConfig,
    pub shape: ShapeConfig,
    pub ocr: OcrSettings,
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter is usable by the pipeline.
    pub fn validate(&self) -> Result<()> {
        let sigma = self.smoothing.sigma;
        if !sigma.is_finite() || sigma <= 0.0 || sigma > MAX_SIGMA {
            return Err(PlateScanError::InvalidParameter(format!(
                "smoothing sigma must be in (0, {MAX_SIGMA}], got {sigma}"
            )));
        }

        let EdgeConfig {
            low_threshold,
            high_threshold,
        } = self.edges;
        if !low_threshold.is_finite() || !high_threshold.is_finite() || low_threshold < 0.0 {
            return Err(PlateScanError::InvalidParameter(format!(
                "edge thresholds must be finite and non-negative, got {low_threshold}/{high_threshold}"
            )));
        }
        if low_threshold >= high_threshold {
            return Err(PlateScanError::InvalidParameter(format!(
                "low edge threshold ({low_threshold}) must be below high threshold ({high_threshold})"
            )));
        }

        let ratio = self.shape.epsilon_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(PlateScanError::InvalidParameter(format!(
                "approximation epsilon ratio must be positive, got {ratio}"
            )));
        }
        if self.shape.vertex_count < 3 {
            return Err(PlateScanError::InvalidParameter(format!(
                "a plate polygon needs at least 3 vertices, got {}",
                self.shape.vertex_count
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_detector() {
        let config = PipelineConfig::default();
        assert_eq!(config.smoothing.sigma, 0.8);
        assert_eq!(config.smoothing.normalization, Normalization::PerTap);
        assert_eq!(config.edges.low_threshold, 30.0);
        assert_eq!(config.edges.high_threshold, 200.0);
        assert_eq!(config.shape.epsilon_ratio, 0.02);
        assert_eq!(config.shape.vertex_count, 4);
        assert!(config.ocr.model_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut config = PipelineConfig::default();
        config.edges.low_threshold = 200.0;
        config.edges.high_threshold = 30.0;
        assert!(matches!(
            config.validate(),
            Err(PlateScanError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_non_positive_sigma() {
        let mut config = PipelineConfig::default();
        config.smoothing.sigma = 0.0;
        assert!(config.validate().is_err());
        config.smoothing.sigma = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_sigma() {
        let mut config = PipelineConfig::default();
        config.smoothing.sigma = MAX_SIGMA;
        assert!(config.validate().is_ok());
        config.smoothing.sigma = 1.0e10;
        assert!(matches!(
            config.validate(),
            Err(PlateScanError::InvalidParameter(_))
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platescan.json");
        std::fs::write(
            &path,
            r#"{ "smoothing": { "normalization": "final" }, "edges": { "high_threshold": 150.0 } }"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.smoothing.sigma, 0.8);
        assert_eq!(config.smoothing.normalization, Normalization::Final);
        assert_eq!(config.edges.low_threshold, 30.0);
        assert_eq!(config.edges.high_threshold, 150.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = PipelineConfig::load("/nonexistent/platescan.json");
        assert!(matches!(result, Err(PlateScanError::Io(_))));
    }
}
